/*
 * @Date         : 2026-02-07
 * @Description  : 参数的初始化、随机化、展平读写与单独保存/加载。
 *                 参数一经注册，其嵌套结构与形状即固定，之后所有写入都是原地覆写
 */

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use log::info;

use super::Model;
use crate::nn::{InitSet, ModelError, ParamSet};
use crate::tensor::Tensor;

impl Model {
    /// 按各层的初始化器生成一份全新的参数。已有参数且结构一致时原地覆写，否则重新注册
    pub fn initialize_params(&mut self) -> Result<(), ModelError> {
        let init = self.tree_ref()?.get_init_params()?;
        if let Some(params) = &self.params {
            if params.matches(&self.store, &init)? {
                params.assign(&mut self.store, &init)?;
                return Ok(());
            }
        }
        self.params = Some(ParamSet::register(&mut self.store, init));
        Ok(())
    }

    /// 重新随机化所有参数（含层状态），保持结构与形状不变，已编译的函数无需重建
    pub fn randomize_params(&mut self) -> Result<(), ModelError> {
        let init = self.tree_ref()?.get_init_params()?;
        self.assign_params(&init)
    }

    /// 全部可训练参数按“分支 -> 层 -> 数组”的先序展平成一条向量
    pub fn get_params_as_vec(&self) -> Result<Vec<f32>, ModelError> {
        let params = self.params_ref()?;
        let mut flat = Vec::new();
        for id in params.trainable() {
            flat.extend(self.store.get(id)?.to_vec());
        }
        Ok(flat)
    }

    /// `get_params_as_vec`的逆操作，长度必须与参数总数一致
    pub fn set_params_as_vec(&mut self, flat: &[f32]) -> Result<(), ModelError> {
        let ids = self.params_ref()?.trainable();
        let mut shapes = Vec::with_capacity(ids.len());
        for id in &ids {
            shapes.push(self.store.get(*id)?.shape().to_vec());
        }
        let expected = shapes.iter().map(|s| s.iter().product::<usize>()).sum();
        if flat.len() != expected {
            return Err(ModelError::ParamVectorLength {
                expected,
                got: flat.len(),
            });
        }

        let mut offset = 0;
        for (id, shape) in ids.into_iter().zip(shapes) {
            let len = shape.iter().product::<usize>();
            let value = Tensor::try_new(&flat[offset..offset + len], &shape)?;
            self.store.set_value(id, &value)?;
            offset += len;
        }
        Ok(())
    }

    /// 可训练参数的元素总数
    pub fn num_params(&self) -> Result<usize, ModelError> {
        let params = self.params_ref()?;
        let mut count = 0;
        for id in params.trainable() {
            count += self.store.get(id)?.size();
        }
        Ok(count)
    }

    /// 只保存参数值（含层状态），嵌套结构同参数集合
    pub fn save_params<P: AsRef<Path>>(&self, path: P) -> Result<(), ModelError> {
        let snapshot = self.params_ref()?.snapshot(&self.store)?;
        let writer = BufWriter::new(File::create(path.as_ref())?);
        bincode::serialize_into(writer, &snapshot)?;
        info!("参数已保存到{}", path.as_ref().display());
        Ok(())
    }

    /// 加载`save_params`保存的参数值，结构与形状须与当前参数一致
    pub fn load_params<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ModelError> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        let init: InitSet = bincode::deserialize_from(reader)?;
        self.assign_params(&init)?;
        info!("已从{}加载参数", path.as_ref().display());
        Ok(())
    }

    fn assign_params(&mut self, init: &InitSet) -> Result<(), ModelError> {
        let params = self.params.as_ref().ok_or(ModelError::ParamsNotInitialized)?;
        if !params.matches(&self.store, init)? {
            return Err(ModelError::ParamStructureMismatch(
                "新参数的嵌套结构或形状与已有参数不一致".to_string(),
            ));
        }
        params.assign(&mut self.store, init)?;
        Ok(())
    }
}
