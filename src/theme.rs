pub mod catppuccin {
    use nu_ansi_term::Color;
    pub struct Mocha;
    impl Mocha {
        pub const SURFACE2: Color = Color::Rgb(108, 112, 134); // Subtle dim

        // Accents
        pub const RED: Color = Color::Rgb(243, 139, 168);
        pub const YELLOW: Color = Color::Rgb(249, 226, 175);
        pub const PEACH: Color = Color::Rgb(250, 179, 135);
    }
}

use nu_ansi_term::Style;
use catppuccin::Mocha;

/// Styles used when a frame is drawn with colour enabled.
pub fn pointer_cell() -> Style {
    Style::new().fg(Mocha::YELLOW).bold()
}

pub fn code_arrow() -> Style {
    Style::new().fg(Mocha::PEACH).bold()
}

pub fn heading() -> Style {
    Style::new().fg(Mocha::SURFACE2)
}

pub fn error() -> Style {
    Style::new().fg(Mocha::RED).bold()
}
