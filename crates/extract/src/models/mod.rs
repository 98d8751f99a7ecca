mod availability;
mod ids;
mod metadata;
mod owned;
mod release;

pub use self::availability::Availability;
pub use self::ids::{AccountId, TitleId};
pub use self::metadata::{Platforms, TitleMetadata};
pub use self::owned::{OwnedTitle, Playtime};
pub use self::release::ReleaseDate;
