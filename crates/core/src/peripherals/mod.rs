pub mod gpio;
pub mod systick;
pub mod uart;
