pub mod interval;
pub mod region;
pub mod sequence;
pub mod variant;

// re-export for cleaner imports
pub use self::interval::{Interval, Strand};
pub use self::region::Region;
pub use self::sequence::Sequence;
pub use self::variant::{Variant, VariantType};
