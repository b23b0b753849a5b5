pub mod dates;
pub mod money;
pub mod normalize;
pub mod order_id;
