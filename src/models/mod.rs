pub mod bundle;
pub mod candidate;
pub mod fix;
pub mod issue;
pub mod reference;
pub mod source;
