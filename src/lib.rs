pub mod hwaddr;
pub mod machines;
pub mod wol;
