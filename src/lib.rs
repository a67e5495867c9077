//! # Okapi
//!
//! `okapi`是一个基于符号计算图的小型神经网络训练框架：
//! 用分支（`Branch`）与层（`Layer`）组成的树来组网，编译出训练/评估/预测函数，
//! 以小批量的方式驱动 SGD、RMSprop 等优化器训练；
//! 另有实验性的“做梦”模式，固定网络参数而转去优化输入。
//!

pub mod data;
pub mod errors;
pub mod nn;
pub mod tensor;
