mod theme;

pub use theme::Style;
