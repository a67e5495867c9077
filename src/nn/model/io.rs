/*
 * @Date         : 2026-02-07
 * @Description  : 整个模型的保存与加载（bincode）。编译得到的函数不参与序列化，
 *                 加载后若模型曾编译过，则按保存的标签形状重新编译（不重新初始化参数）
 */

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use log::info;

use super::Model;
use crate::nn::ModelError;

impl Model {
    /// 保存整个模型：网络树、损失/准确率、两个优化器、共享仓库与参数集合
    pub fn save_model<P: AsRef<Path>>(&self, path: P) -> Result<(), ModelError> {
        let writer = BufWriter::new(File::create(path.as_ref())?);
        bincode::serialize_into(writer, self)?;
        info!("模型已保存到{}", path.as_ref().display());
        Ok(())
    }

    /// 加载`save_model`保存的模型；保存时已编译的模型加载后可直接预测
    pub fn load_model<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        let mut model: Self = bincode::deserialize_from(reader)?;
        if model.label_shape.is_some() && model.params.is_some() && model.tree.is_some() {
            model.compiled = Some(model.build_functions()?);
        }
        info!("已从{}加载模型", path.as_ref().display());
        Ok(model)
    }
}
