mod quantile;

pub use quantile::*;
