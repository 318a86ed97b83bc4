pub mod process;
pub mod sway;
pub mod sysfs;
pub mod tags;
pub mod wav;
