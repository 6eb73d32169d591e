mod extraction;
mod reference;

pub use extraction::ExtractionCommands;
pub use reference::ReferenceCommands;
