//! Beam model entities: materials, sections, supports, loads, spans

pub mod beam;
pub mod load;
pub mod material;
pub mod section;
pub mod span;
pub mod support;

pub use beam::BeamModel;
pub use load::Load;
pub use material::{Concrete, Steel};
pub use section::{CrossSection, SectionShape};
pub use span::Span;
pub use support::Support;
