/*
 * @Date         : 2026-02-06
 * @Description  : 训练/做梦的配置项，支持链式设置与 JSON 读写
 */

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::nn::ModelError;

/// 训练配置
///
/// # 示例
/// ```ignore
/// let config = TrainConfig::new()
///     .epochs(50)
///     .batch_size(2)
///     .seed(42);
/// let report = model.train(&[x], &y, &config)?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub epochs: usize,
    pub batch_size: usize,
    /// 每个epoch开始前是否重新打乱并分批
    pub shuffle: bool,
    /// 首次编译时是否重新初始化参数
    pub initialize_params: bool,
    /// 打乱用的随机种子，`None`时每次都不同
    pub seed: Option<u64>,
    /// 是否在控制台打印进度
    pub verbose: bool,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            epochs: 12,
            batch_size: 128,
            shuffle: true,
            initialize_params: true,
            seed: None,
            verbose: true,
        }
    }
}

impl TrainConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    pub fn initialize_params(mut self, initialize_params: bool) -> Self {
        self.initialize_params = initialize_params;
        self
    }

    /// 设置随机种子（用于 shuffle）
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    }

    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ModelError> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// 做梦模式配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DreamConfig {
    /// 每个样本上做梦更新的固定次数（不做收敛判断）
    pub max_dream_length: usize,
    /// 每处理这么多行打印一次进度，0表示不打印
    pub progress_every: usize,
}

impl Default for DreamConfig {
    fn default() -> Self {
        Self {
            max_dream_length: 24,
            progress_every: 1000,
        }
    }
}

impl DreamConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_dream_length(mut self, max_dream_length: usize) -> Self {
        self.max_dream_length = max_dream_length;
        self
    }

    pub fn progress_every(mut self, progress_every: usize) -> Self {
        self.progress_every = progress_every;
        self
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    }

    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ModelError> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
