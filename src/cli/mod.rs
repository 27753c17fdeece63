pub mod capacity;
pub mod compare;
pub mod detect;
pub mod embed;
pub mod extract;
pub mod generate;
pub mod split;

pub use capacity::*;
pub use compare::*;
pub use detect::*;
pub use embed::*;
pub use extract::*;
pub use generate::*;
pub use split::*;
