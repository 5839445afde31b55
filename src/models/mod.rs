pub mod audit;
pub mod notification;
pub mod user;
pub mod work_order;
