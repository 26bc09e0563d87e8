//! Interactive menu commands.

/// One entry of the interactive menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    SearchStations,
    ReadingsLast24Hours,
    Readings,
    StationMeasures,
    StationInfo,
    Acronyms,
    MeasureTypes,
    Quit,
}

impl MenuCommand {
    pub const ALL: [MenuCommand; 8] = [
        MenuCommand::SearchStations,
        MenuCommand::ReadingsLast24Hours,
        MenuCommand::Readings,
        MenuCommand::StationMeasures,
        MenuCommand::StationInfo,
        MenuCommand::Acronyms,
        MenuCommand::MeasureTypes,
        MenuCommand::Quit,
    ];

    /// Key the user types to select the command.
    pub fn key(&self) -> &'static str {
        match self {
            MenuCommand::SearchStations => "1",
            MenuCommand::ReadingsLast24Hours => "2",
            MenuCommand::Readings => "3",
            MenuCommand::StationMeasures => "4",
            MenuCommand::StationInfo => "5",
            MenuCommand::Acronyms => "6",
            MenuCommand::MeasureTypes => "7",
            MenuCommand::Quit => "q",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            MenuCommand::SearchStations => "Search stations by name or keyword",
            MenuCommand::ReadingsLast24Hours => "Readings of all measures over the last 24 hours",
            MenuCommand::Readings => "Readings for a chosen date range and measure",
            MenuCommand::StationMeasures => "Measures recorded at a station",
            MenuCommand::StationInfo => "Station information",
            MenuCommand::Acronyms => "Unit acronym definitions",
            MenuCommand::MeasureTypes => "Measure type descriptions",
            MenuCommand::Quit => "Quit",
        }
    }

    pub fn from_key(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.eq_ignore_ascii_case("quit") || input.eq_ignore_ascii_case("exit") {
            return Some(MenuCommand::Quit);
        }
        MenuCommand::ALL
            .into_iter()
            .find(|c| c.key().eq_ignore_ascii_case(input))
    }

    /// The menu as printed before each prompt.
    pub fn render_menu() -> String {
        let mut out = String::from("\nAvailable commands:\n");
        for c in MenuCommand::ALL {
            out.push_str(&format!("\t{}. {}\n", c.key(), c.description()));
        }
        out
    }
}
