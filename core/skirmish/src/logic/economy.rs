//! 陣營經濟：資源、行動點與計時結算

use crate::domain::alias::{ActionPoints, Resources, Timestamp};
use crate::error::CommandError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Economy {
    pub resources: Resources,
    /// 只在行動點制度下使用
    pub action_points: ActionPoints,
    pub last_recovery: Timestamp,
    pub last_income: Timestamp,
}

impl Economy {
    pub fn new(resources: Resources, action_points: ActionPoints, now: Timestamp) -> Self {
        Self {
            resources,
            action_points,
            last_recovery: now,
            last_income: now,
        }
    }

    /// 依經過時間恢復行動點，回傳恢復的點數
    ///
    /// 每滿一個間隔恢復 1 點（嚴格邊界：差 1 毫秒不算），不超過上限。
    /// 計時器固定以整數個間隔推進，已滿時也照常推進，不會囤積恢復次數，
    /// 恢復時間點與外部時鐘的呼叫頻率無關。
    pub fn recover_action_points(
        &mut self,
        now: Timestamp,
        max_points: ActionPoints,
        interval: Timestamp,
    ) -> ActionPoints {
        if now <= self.last_recovery || interval == 0 {
            return 0;
        }
        let periods = (now - self.last_recovery) / interval;
        self.last_recovery += periods * interval;

        let missing = max_points.saturating_sub(self.action_points);
        let recovered = ActionPoints::try_from(periods)
            .unwrap_or(ActionPoints::MAX)
            .min(missing);
        self.action_points += recovered;
        recovered
    }

    /// 消耗 1 行動點
    pub fn spend_action_point(&mut self) -> bool {
        if self.action_points == 0 {
            return false;
        }
        self.action_points -= 1;
        true
    }

    /// 扣除資源，不足時不變動
    pub fn spend(&mut self, cost: Resources) -> Result<(), CommandError> {
        if self.resources < cost {
            return Err(CommandError::InsufficientFunds {
                cost,
                available: self.resources,
            });
        }
        self.resources -= cost;
        Ok(())
    }

    pub fn credit(&mut self, amount: Resources) {
        self.resources = self.resources.saturating_add(amount);
    }

    /// 即時收入：回傳經過的完整結算週期數，並推進計時器
    pub fn elapsed_income_periods(&mut self, now: Timestamp, interval: Timestamp) -> u64 {
        if now <= self.last_income || interval == 0 {
            return 0;
        }
        let periods = (now - self.last_income) / interval;
        self.last_income += periods * interval;
        periods
    }
}
