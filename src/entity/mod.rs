pub mod coupon;
pub mod policy;

pub use policy::DiscountType;
