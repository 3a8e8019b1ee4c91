/// 時刻取得の抽象化
pub mod clock;

/// nanoIdによるID生成
pub mod nanoid;

pub use clock::{Clock, FixedClock, SystemClock};
pub use nanoid::generate_subscription_id;
