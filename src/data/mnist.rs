//! MNIST 手写数字数据集
//!
//! 支持：
//! - IDX 二进制格式解析（.gz 压缩，图像跳过16字节头，标签跳过8字节头）
//! - 像素缩放（除以256）
//! - 标签 one-hot 编码
//! - 缺失时自动下载

use std::path::{Path, PathBuf};

use log::info;

use super::download::get_file;
use super::error::DataError;
use super::transforms::{get_val_set, scale_pixels, vec_to_onehot};
use crate::tensor::Tensor;

/// MNIST 下载地址（使用 AWS S3 镜像，原官网 yann.lecun.com 不稳定）
pub const MNIST_BASE_URL: &str = "https://ossci-datasets.s3.amazonaws.com/mnist/";

const IMAGE_HEADER: usize = 16;
const LABEL_HEADER: usize = 8;

/// MNIST 文件信息（文件名，MD5）
const MNIST_FILES: [(&str, &str); 4] = [
    (
        "train-images-idx3-ubyte.gz",
        "f68b3c2dcbeaaa9fbdd348bbdeb94873",
    ),
    (
        "train-labels-idx1-ubyte.gz",
        "d53e105ee54ea40749a09fcbcd1e9432",
    ),
    (
        "t10k-images-idx3-ubyte.gz",
        "9fb629c4189551a2d022fa330f9573f3",
    ),
    (
        "t10k-labels-idx1-ubyte.gz",
        "ec29112dd5afa0611ce80d1b7f02629c",
    ),
];

/// 划分好的 MNIST 数据：图像`[N, 1, 28, 28]`，标签`[N, 10]`（one-hot）
#[derive(Debug, Clone)]
pub struct Mnist {
    pub x_train: Tensor,
    pub y_train: Tensor,
    pub x_val: Tensor,
    pub y_val: Tensor,
    pub x_test: Tensor,
    pub y_test: Tensor,
}

/// 获取默认数据目录
pub fn default_data_dir() -> PathBuf {
    PathBuf::from("datasets").join("mnist")
}

/// 加载 MNIST，并从训练集末尾切出`val_size`行作为验证集
///
/// # 参数
/// - `root`: 数据目录，None 则使用默认 (./datasets/mnist)
/// - `val_size`: 验证集大小（原始训练集共60000行）
pub fn load_mnist(root: Option<&Path>, val_size: usize) -> Result<Mnist, DataError> {
    info!("Loading data...");
    let dir = root.map_or_else(default_data_dir, Path::to_path_buf);

    let x_train = load_images(&dir, MNIST_FILES[0])?;
    let y_train = load_labels(&dir, MNIST_FILES[1])?;
    let x_test = load_images(&dir, MNIST_FILES[2])?;
    let y_test = load_labels(&dir, MNIST_FILES[3])?;

    let (x_train, y_train, x_val, y_val) = get_val_set(&x_train, &y_train, val_size)?;
    Ok(Mnist {
        x_train,
        y_train,
        x_val,
        y_val,
        x_test,
        y_test,
    })
}

fn load_images(dir: &Path, (name, md5): (&str, &str)) -> Result<Tensor, DataError> {
    let bytes = get_file(name, MNIST_BASE_URL, dir, Some(md5), IMAGE_HEADER)?;
    let image_size = 28 * 28;
    if bytes.len() % image_size != 0 {
        return Err(DataError::FormatError(format!(
            "{name} 的像素数 {} 不是 28*28 的整数倍",
            bytes.len()
        )));
    }
    scale_pixels(&bytes, &[bytes.len() / image_size, 1, 28, 28])
}

fn load_labels(dir: &Path, (name, md5): (&str, &str)) -> Result<Tensor, DataError> {
    let bytes = get_file(name, MNIST_BASE_URL, dir, Some(md5), LABEL_HEADER)?;
    vec_to_onehot(&bytes)
}
