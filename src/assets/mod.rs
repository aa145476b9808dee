pub mod layout;
pub mod sheet;

pub use layout::{IconSource, KeyboardLayout};
pub use sheet::{find_origin, IconAtlas, SheetOrigin};
