/*
 * @Date         : 2026-02-07
 * @Description  : 训练循环与评估：按批调用“更新一步”函数，控制台逐批刷新进度；
 *                 预测、训练/测试损失与分批准确率
 */

use std::io::{self, Write};
use std::time::Instant;

use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::{Model, canonicalize, scalar_output};
use crate::data::{BatchLayout, make_batches};
use crate::nn::{ModelError, TrainConfig, TraitOptimizer};
use crate::tensor::Tensor;

/// 训练结果：每个epoch的平均损失
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainReport {
    pub epoch_losses: Vec<f32>,
}

impl TrainReport {
    pub fn final_loss(&self) -> Option<f32> {
        self.epoch_losses.last().copied()
    }
}

impl Model {
    /// 训练模型，尚未编译时先编译。总是跑满`config.epochs`个epoch
    pub fn train(
        &mut self,
        x: &[Tensor],
        y: &Tensor,
        config: &TrainConfig,
    ) -> Result<TrainReport, ModelError> {
        self.num_output_dims = Some(y.dimension());
        let x = canonicalize(x);
        let y = y.atleast_4d();
        if self.compiled.is_none() {
            self.compile(&x, &y, config.initialize_params)?;
        }
        self.check_data_inputs(x.len())?;
        // 编译后对超参数的修改在此写回仓库
        self.optimizer.sync_hyperparameters(&mut self.store)?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        // 不打乱时只需分批一次
        let fixed = if config.shuffle {
            None
        } else {
            Some(make_batches(
                &x,
                &y,
                config.batch_size,
                false,
                BatchLayout::Nested,
                &mut rng,
            )?)
        };

        info!("Started training...");
        let compiled = self.compiled.as_ref().ok_or(ModelError::NotCompiled)?;
        let mut report = TrainReport::default();
        for epoch in 0..config.epochs {
            let epoch_start = Instant::now();
            let shuffled;
            let batches = match &fixed {
                Some(batches) => batches,
                None => {
                    shuffled = make_batches(
                        &x,
                        &y,
                        config.batch_size,
                        true,
                        BatchLayout::Nested,
                        &mut rng,
                    )?;
                    &shuffled
                }
            };

            let num_batches = batches.num_batches;
            let mut total_loss = 0.0;
            for (batch_num, (x_batch, y_batch)) in batches.x.iter().zip(&batches.y).enumerate() {
                let batch_start = Instant::now();
                let mut args = x_batch.iter().collect::<Vec<_>>();
                args.push(y_batch);
                let outputs = compiled
                    .update_step
                    .call(&compiled.graph, &mut self.store, &args)?;
                let loss = scalar_output(&outputs)?;
                total_loss += loss;

                if config.verbose {
                    let batch_time = batch_start.elapsed().as_secs_f32();
                    let time_rem = est_time_remaining(batch_time, batch_num, num_batches);
                    write_progress(epoch, config.epochs, batch_num, num_batches, time_rem, loss)?;
                }
            }

            let avg_loss = total_loss / num_batches.max(1) as f32;
            if config.verbose {
                let epoch_time = epoch_start.elapsed().as_secs_f32();
                write_progress(
                    epoch,
                    config.epochs,
                    num_batches.saturating_sub(1),
                    num_batches,
                    epoch_time,
                    avg_loss,
                )?;
                println!();
            }
            report.epoch_losses.push(avg_loss);
        }
        Ok(report)
    }

    /// 推理模式下的预测，结果展平到标签的原始维数
    pub fn predict(&self, x: &[Tensor]) -> Result<Tensor, ModelError> {
        self.check_data_inputs(x.len())?;
        let compiled = self.compiled_ref()?;
        let x = canonicalize(x);
        let args = x.iter().collect::<Vec<_>>();
        let outputs = compiled.predict.call_pure(&compiled.graph, &self.store, &args)?;
        let prediction = outputs.into_iter().next().ok_or(ModelError::NotCompiled)?;
        self.flatten_prediction(&prediction)
    }

    /// 训练损失（训练模式前向，含正则项）
    pub fn get_train_loss(&self, x: &[Tensor], y: &Tensor) -> Result<f32, ModelError> {
        self.check_data_inputs(x.len())?;
        let compiled = self.compiled_ref()?;
        self.evaluate_scalar(&compiled.train_loss, x, y)
    }

    /// 测试损失（推理模式前向，不含正则项）
    pub fn get_test_loss(&self, x: &[Tensor], y: &Tensor) -> Result<f32, ModelError> {
        self.check_data_inputs(x.len())?;
        let compiled = self.compiled_ref()?;
        self.evaluate_scalar(&compiled.test_loss, x, y)
    }

    /// 分批求准确率后取平均，返回百分数
    pub fn get_accuracy(
        &self,
        x: &[Tensor],
        y: &Tensor,
        batch_size: usize,
        shuffle: bool,
    ) -> Result<f32, ModelError> {
        self.check_data_inputs(x.len())?;
        let compiled = self.compiled_ref()?;
        let batches = make_batches(
            x,
            y,
            batch_size,
            shuffle,
            BatchLayout::Nested,
            &mut rand::thread_rng(),
        )?;
        let mut accuracy = 0.0;
        for (x_batch, y_batch) in batches.x.iter().zip(&batches.y) {
            accuracy += self.evaluate_scalar(&compiled.test_acc, x_batch, y_batch)?;
        }
        Ok(accuracy / batches.num_batches.max(1) as f32 * 100.0)
    }

    fn evaluate_scalar(
        &self,
        function: &crate::nn::Function,
        x: &[Tensor],
        y: &Tensor,
    ) -> Result<f32, ModelError> {
        let compiled = self.compiled_ref()?;
        let x = canonicalize(x);
        let y = y.atleast_4d();
        let mut args = x.iter().collect::<Vec<_>>();
        args.push(&y);
        let outputs = function.call_pure(&compiled.graph, &self.store, &args)?;
        scalar_output(&outputs)
    }

    pub(super) fn flatten_prediction(&self, prediction: &Tensor) -> Result<Tensor, ModelError> {
        let ndim = self.num_output_dims.unwrap_or(prediction.dimension());
        Ok(prediction.flatten_to(ndim.max(1))?)
    }
}

/// 以最近一批的耗时外推剩余时间
fn est_time_remaining(last_time: f32, iteration: usize, num_iterations: usize) -> f32 {
    let iterations_left = num_iterations.saturating_sub(iteration + 1);
    last_time * iterations_left as f32
}

fn write_progress(
    epoch: usize,
    num_epochs: usize,
    batch_num: usize,
    num_batches: usize,
    time: f32,
    loss: f32,
) -> Result<(), ModelError> {
    let mut stdout = io::stdout();
    write!(
        stdout,
        "\rEpoch {}/{} | Batch {}/{} | Time: {:.1}s | Loss: {}   ",
        epoch + 1,
        num_epochs,
        batch_num + 1,
        num_batches,
        time,
        loss
    )?;
    stdout.flush()?;
    Ok(())
}
