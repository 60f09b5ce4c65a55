//! 포트폴리오 빌드 전반에서 사용되는 공통 타입.

mod allocation;
mod decimal;
mod fundamentals;
mod price;
mod records;

pub use allocation::*;
pub use decimal::*;
pub use fundamentals::*;
pub use price::*;
pub use records::*;
