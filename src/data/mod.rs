//! 数据模块
//!
//! 提供分批、数据集下载与预处理功能。
//!
//! # 主要组件
//!
//! - [`make_batches`]: 多输入 + 标签的联合打乱与近似均分分批
//! - [`mnist`]: MNIST 手写数字数据集（分类任务）
//! - [`transforms`]: 数据变换函数（像素缩放、one-hot、验证集划分）
//! - [`download`]: 缺失才下载、MD5 校验、gzip 解压
//! - [`DataError`]: 数据错误类型
//!
//! # 使用示例
//!
//! ```ignore
//! use okapi::data::{make_batches, BatchLayout};
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let batches = make_batches(&[x], &y, 32, true, BatchLayout::Nested, &mut rng)?;
//! for (x_batch, y_batch) in batches.x.iter().zip(&batches.y) {
//!     // ...
//! }
//! ```

mod batching;
pub mod download;
pub mod error;
pub mod mnist;
pub mod transforms;

#[cfg(test)]
mod tests;

pub use batching::{BatchLayout, Batches, make_batches, num_batches};
pub use error::DataError;
pub use mnist::{Mnist, load_mnist};
