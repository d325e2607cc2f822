pub mod constants;
pub mod loader;
pub mod runtime;

pub use self::loader::load;
pub use self::runtime::Machine;
