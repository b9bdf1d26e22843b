//! 套餐能力模块
//!
//! 免费版 / 专业版的差异只体现在“调用方提供哪些选项”上：
//! 合成器本身从不检查套餐，是否允许自定义画幅、一次上传几张，
//! 都由调用方在提交前用 `Plan` 判断。

use crate::compositor::{CompositeError, TargetFrame};

/// 免费版单次最多提交的图片数量。
pub const FREE_UPLOAD_LIMIT: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Plan {
    #[default]
    Free,
    Pro,
}

impl Plan {
    pub fn from_flag(pro: bool) -> Self {
        if pro { Self::Pro } else { Self::Free }
    }

    /// 当前套餐可选的画幅。
    pub fn available_frames(self) -> Vec<TargetFrame> {
        TargetFrame::ALL
            .into_iter()
            .filter(|frame| self.offers(*frame))
            .collect()
    }

    pub fn offers(self, frame: TargetFrame) -> bool {
        match self {
            Self::Pro => true,
            Self::Free => frame != TargetFrame::Custom,
        }
    }

    pub fn upload_limit(self) -> Option<usize> {
        match self {
            Self::Free => Some(FREE_UPLOAD_LIMIT),
            Self::Pro => None,
        }
    }

    pub fn ensure_frame(self, frame: TargetFrame) -> Result<(), CompositeError> {
        if self.offers(frame) {
            Ok(())
        } else {
            Err(CompositeError::PlanLimit(format!(
                "{} 画幅仅对专业版开放",
                frame.display_name()
            )))
        }
    }

    pub fn check_upload(self, count: usize) -> Result<(), CompositeError> {
        match self.upload_limit() {
            Some(limit) if count > limit => Err(CompositeError::PlanLimit(format!(
                "免费版单次最多处理 {} 张图片（本次 {} 张），升级专业版可解除限制",
                limit, count
            ))),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_plan_hides_custom_frame() {
        assert_eq!(
            Plan::Free.available_frames(),
            vec![TargetFrame::Square, TargetFrame::Portrait, TargetFrame::Landscape]
        );
        assert!(matches!(
            Plan::Free.ensure_frame(TargetFrame::Custom),
            Err(CompositeError::PlanLimit(_))
        ));
        assert_eq!(Plan::Pro.available_frames().len(), 4);
        assert!(Plan::Pro.ensure_frame(TargetFrame::Custom).is_ok());
    }

    #[test]
    fn free_plan_limits_uploads() {
        assert!(Plan::Free.check_upload(2).is_ok());
        assert!(matches!(Plan::Free.check_upload(3), Err(CompositeError::PlanLimit(_))));
        assert!(Plan::Pro.check_upload(500).is_ok());
        assert_eq!(Plan::from_flag(true), Plan::Pro);
        assert_eq!(Plan::default(), Plan::Free);
    }
}
