pub mod user;
pub mod household;
pub mod household_member;
