pub mod coupon;
pub mod key_manager;
pub mod policy;
#[cfg(test)]
pub mod test_utils;

pub use coupon::Coupon;
pub use key_manager::KeyManager;
pub use policy::Policy;
