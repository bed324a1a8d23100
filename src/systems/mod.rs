//! Prebuilt boards.

pub mod adder;
pub mod ben_eater;
pub mod lcd_demo;

pub use adder::adder_board;
pub use ben_eater::BenEater;
pub use lcd_demo::lcd_board;
