//! 指令：驗證 → 變更 → 回傳結果
//!
//! 每個指令在任何變更前完成所有檢查，失敗時對局狀態不變。
//! 成功的指令會清除目前的選擇。

use crate::config::{ActionEconomy, IncomeModel};
use crate::domain::alias::{ActionPoints, Health, MovementCost, Resources, Timestamp, UnitId};
use crate::domain::core_types::{Faction, Position, UnitKind};
use crate::engine::state::{Match, Phase, Selection};
use crate::error::{BoardError, CommandError, Result};
use crate::logic::capture::{CaptureProgress, abandon_capture, advance_capture, objective_income};
use crate::logic::combat::{Combatant, apply_damage, resolve_damage};
use crate::logic::reachability::{reachable_positions, reachable_tiles, reconstruct_path};
use crate::logic::targeting::{attackable_tiles, in_attack_range};
use crate::unit::Unit;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 可排入佇列的指令，[`Match::apply`] 是唯一的寫入入口
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    Select { pos: Position },
    Move { from: Position, to: Position },
    Attack { attacker: Position, target: Position },
    Capture { pos: Position },
    Purchase { pos: Position, kind: UnitKind },
    EndTurn,
    Tick { now: Timestamp },
    Cancel,
    Click { pos: Position },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOutcome {
    pub from: Position,
    pub to: Position,
    /// 含起點與終點
    pub path: Vec<Position>,
    pub cost: MovementCost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DefenderState {
    Remaining(Health),
    Destroyed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackOutcome {
    pub attacker: Position,
    pub target: Position,
    pub damage: Health,
    pub defender: DefenderState,
    /// 此次攻擊結束了對局
    pub winner: Option<Faction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureOutcome {
    pub pos: Position,
    pub faction: Faction,
    pub progress: CaptureProgress,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOutcome {
    pub unit_id: UnitId,
    pub kind: UnitKind,
    pub pos: Position,
    pub faction: Faction,
    pub remaining: Resources,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnOutcome {
    pub previous: Faction,
    pub current: Faction,
    pub turn: u32,
    /// 新陣營在回合開始時獲得的收入
    pub income: Resources,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickOutcome {
    pub recovered: Vec<(Faction, ActionPoints)>,
    pub income: Vec<(Faction, Resources)>,
}

/// 點擊格子的結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClickOutcome {
    Selected(Selection),
    Moved(MoveOutcome),
    Attacked(AttackOutcome),
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandOutcome {
    Selected(Selection),
    Moved(MoveOutcome),
    Attacked(AttackOutcome),
    Captured(CaptureOutcome),
    Purchased(PurchaseOutcome),
    TurnEnded(TurnOutcome),
    Ticked(TickOutcome),
    Cancelled,
    Clicked(ClickOutcome),
}

impl Match {
    /// 依序執行一個指令
    pub fn apply(&mut self, command: Command) -> Result<CommandOutcome> {
        debug!("執行指令: {command:?}");
        let outcome = match command {
            Command::Select { pos } => CommandOutcome::Selected(self.select_unit(pos)?),
            Command::Move { from, to } => CommandOutcome::Moved(self.move_unit(from, to)?),
            Command::Attack { attacker, target } => {
                CommandOutcome::Attacked(self.attack(attacker, target)?)
            }
            Command::Capture { pos } => CommandOutcome::Captured(self.capture(pos)?),
            Command::Purchase { pos, kind } => {
                CommandOutcome::Purchased(self.purchase_unit(pos, kind)?)
            }
            Command::EndTurn => CommandOutcome::TurnEnded(self.end_turn()?),
            Command::Tick { now } => CommandOutcome::Ticked(self.tick(now)?),
            Command::Cancel => {
                self.cancel_selection()?;
                CommandOutcome::Cancelled
            }
            Command::Click { pos } => CommandOutcome::Clicked(self.click(pos)?),
        };
        Ok(outcome)
    }

    /// 選擇單位，回傳可移動與可攻擊的格子
    pub fn select_unit(&mut self, pos: Position) -> Result<Selection> {
        self.ensure_running()?;
        let unit = self.acting_unit(pos)?;
        if !self.has_action_left(unit) {
            return Err(CommandError::NoActionsLeft { pos }.into());
        }

        let per_turn = self.is_per_turn();
        let reachable = if per_turn && unit.has_moved {
            Default::default()
        } else {
            reachable_tiles(&self.board, &self.catalogs, pos)
        };
        let targets = if per_turn && unit.has_attacked {
            Default::default()
        } else {
            attackable_tiles(&self.board, &self.catalogs, pos)
        };

        let selection = Selection {
            pos,
            reachable,
            targets,
        };
        debug!(
            "選擇 {pos}: 可移動 {} 格，可攻擊 {} 格",
            selection.reachable.len(),
            selection.targets.len()
        );
        self.phase = Phase::UnitSelected(selection.clone());
        Ok(selection)
    }

    /// 移動單位，回傳實際走過的路徑
    pub fn move_unit(&mut self, from: Position, to: Position) -> Result<MoveOutcome> {
        self.ensure_running()?;
        let unit = self.acting_unit(from)?;
        self.ensure_slot_available(unit, unit.has_moved)?;
        let faction = unit.faction;
        let budget = self.catalogs.unit(unit.kind).move_range;

        self.board.tile_at(to)?;
        if to == from || self.board.unit_at(to).is_some() {
            return Err(CommandError::InvalidDestination { pos: to }.into());
        }
        let reachable = reachable_positions(&self.board, &self.catalogs, from, budget);
        let cost = match reachable.get(&to) {
            Some(info) if !info.passthrough => info.cost,
            _ => return Err(CommandError::NotReachable { pos: to }.into()),
        };
        let path = reconstruct_path(&reachable, from, to)?;

        abandon_capture(&mut self.board, from, faction);
        self.board.move_unit(from, to)?;
        if let Some(unit) = self.board.unit_at_mut(to) {
            unit.has_moved = true;
        }
        self.consume_action_point(faction)?;
        self.phase = Phase::AwaitingSelection;

        debug!("{faction} 移動 {from} → {to}，消耗 {cost}");
        Ok(MoveOutcome {
            from,
            to,
            path,
            cost,
        })
    }

    /// 攻擊目標，攻擊方原地不動
    pub fn attack(&mut self, attacker_pos: Position, target_pos: Position) -> Result<AttackOutcome> {
        self.ensure_running()?;
        let attacker = self.acting_unit(attacker_pos)?;
        self.ensure_slot_available(attacker, attacker.has_attacked)?;

        let defender = match self.board.unit_at(target_pos) {
            Some(defender) if defender.faction != attacker.faction => defender,
            _ => return Err(CommandError::InvalidTarget { pos: target_pos }.into()),
        };
        let attacker_archetype = self.catalogs.unit(attacker.kind);
        if !in_attack_range(attacker_archetype, attacker_pos, target_pos) {
            return Err(CommandError::OutOfRange { pos: target_pos }.into());
        }

        let terrain = self
            .catalogs
            .terrain(self.board.tile_at(target_pos)?.terrain);
        let damage = resolve_damage(
            self.config.ruleset.damage_model,
            Combatant {
                unit: attacker,
                archetype: attacker_archetype,
            },
            Combatant {
                unit: defender,
                archetype: self.catalogs.unit(defender.kind),
            },
            terrain,
        );
        let attacker_faction = attacker.faction;
        let defender_faction = defender.faction;

        let destroyed = match self.board.unit_at_mut(target_pos) {
            Some(defender) => apply_damage(defender, damage),
            None => return Err(BoardError::NoUnitAtPos { pos: target_pos }.into()),
        };
        let defender_state = if destroyed {
            self.board.remove_unit(target_pos)?;
            abandon_capture(&mut self.board, target_pos, defender_faction);
            info!("{attacker_faction} 擊毀了 {target_pos} 的{defender_faction}單位");
            DefenderState::Destroyed
        } else {
            let remaining = self
                .board
                .unit_at(target_pos)
                .map(|unit| unit.health)
                .unwrap_or_default();
            DefenderState::Remaining(remaining)
        };

        if let Some(unit) = self.board.unit_at_mut(attacker_pos) {
            unit.has_attacked = true;
        }
        self.consume_action_point(attacker_faction)?;
        self.phase = Phase::AwaitingSelection;
        debug!("{attacker_faction} {attacker_pos} 攻擊 {target_pos}，造成 {damage} 傷害");

        let winner = if destroyed {
            self.update_elimination()
        } else {
            None
        };
        Ok(AttackOutcome {
            attacker: attacker_pos,
            target: target_pos,
            damage,
            defender: defender_state,
            winner,
        })
    }

    /// 佔領單位所在的據點，佔用本回合的攻擊行動
    pub fn capture(&mut self, pos: Position) -> Result<CaptureOutcome> {
        self.ensure_running()?;
        let unit = self.acting_unit(pos)?;
        self.ensure_slot_available(unit, unit.has_attacked)?;
        let faction = unit.faction;
        if !self.catalogs.unit(unit.kind).can_capture {
            return Err(CommandError::NotCaptureCapable { kind: unit.kind }.into());
        }

        let objective = self
            .board
            .tile_at_mut(pos)?
            .objective
            .as_mut()
            .ok_or(CommandError::NotAnObjective { pos })?;
        let progress = advance_capture(objective, pos, faction)?;

        if let Some(unit) = self.board.unit_at_mut(pos) {
            unit.has_attacked = true;
        }
        self.consume_action_point(faction)?;
        self.phase = Phase::AwaitingSelection;

        match progress {
            CaptureProgress::Progressed { progress } => {
                info!("{faction} 佔領 {pos} 進度 {progress}");
            }
            CaptureProgress::Captured { previous_owner } => {
                info!("{faction} 佔領了 {pos}（原擁有者 {previous_owner:?}）");
            }
        }
        Ok(CaptureOutcome {
            pos,
            faction,
            progress,
        })
    }

    /// 在己方據點購買單位
    ///
    /// 回合制下由目前陣營購買，新單位要到下個回合才能行動；
    /// 行動點制下由據點擁有者購買，新單位立即可用。
    pub fn purchase_unit(&mut self, pos: Position, kind: UnitKind) -> Result<PurchaseOutcome> {
        self.ensure_running()?;
        let per_turn = self.is_per_turn();
        let tile = self.board.tile_at(pos)?;
        let objective = tile
            .objective
            .as_ref()
            .ok_or(CommandError::NotAnObjective { pos })?;
        let buyer = match objective.owner {
            Some(owner) if !per_turn => owner,
            _ => self.current_faction,
        };
        if objective.owner != Some(buyer) || self.eliminated.contains(&buyer) {
            return Err(CommandError::NotYourUnit {
                pos,
                faction: buyer,
            }
            .into());
        }
        if tile.unit.is_some() {
            return Err(BoardError::TileOccupied { pos }.into());
        }
        let cost = self.catalogs.unit(kind).cost;
        let available = self.economy_mut(buyer)?.resources;
        if available < cost {
            return Err(CommandError::InsufficientFunds { cost, available }.into());
        }

        let unit_id = self.spawn_unit(pos, kind, buyer)?;
        if per_turn {
            if let Some(unit) = self.board.unit_at_mut(pos) {
                unit.has_moved = true;
                unit.has_attacked = true;
            }
        }
        let economy = self.economy_mut(buyer)?;
        economy.spend(cost)?;
        let remaining = economy.resources;
        self.phase = Phase::AwaitingSelection;

        debug!("{buyer} 在 {pos} 購買 {kind}，剩餘 {remaining}");
        Ok(PurchaseOutcome {
            unit_id,
            kind,
            pos,
            faction: buyer,
            remaining,
        })
    }

    /// 結束回合，輪到下一個未被淘汰的陣營
    pub fn end_turn(&mut self) -> Result<TurnOutcome> {
        self.ensure_running()?;
        let previous = self.current_faction;
        let count = self.economies.len();
        let next = (1..=count)
            .map(|offset| (previous.index() + offset) % count)
            .filter_map(|index| u8::try_from(index).ok().map(Faction))
            .find(|faction| !self.eliminated.contains(faction))
            .unwrap_or(previous);
        if next.index() <= previous.index() {
            self.turn += 1;
        }
        self.current_faction = next;

        for unit in self.board.units_mut().filter(|unit| unit.faction == next) {
            unit.refresh();
        }

        let income = match self.config.ruleset.income_model {
            IncomeModel::TurnStart { amount } => objective_income(&self.board, next, amount),
            IncomeModel::RealTime { .. } => 0,
        };
        self.economy_mut(next)?.credit(income);
        self.phase = Phase::AwaitingSelection;

        debug!("第 {} 輪，輪到{next}，收入 {income}", self.turn);
        Ok(TurnOutcome {
            previous,
            current: next,
            turn: self.turn,
            income,
        })
    }

    /// 外部時鐘：恢復行動點並結算即時收入
    pub fn tick(&mut self, now: Timestamp) -> Result<TickOutcome> {
        self.ensure_running()?;
        let mut outcome = TickOutcome::default();
        let factions: Vec<Faction> = self
            .factions()
            .filter(|faction| !self.eliminated.contains(faction))
            .collect();

        for faction in factions {
            if let ActionEconomy::ActionPoints {
                max_points,
                recovery_interval_ms,
            } = self.config.ruleset.action_economy
            {
                let recovered = self.economy_mut(faction)?.recover_action_points(
                    now,
                    max_points,
                    recovery_interval_ms,
                );
                if recovered > 0 {
                    debug!("{faction} 恢復 {recovered} 行動點");
                    outcome.recovered.push((faction, recovered));
                }
            }

            if let IncomeModel::RealTime {
                amount,
                interval_ms,
            } = self.config.ruleset.income_model
            {
                let periods = self
                    .economy_mut(faction)?
                    .elapsed_income_periods(now, interval_ms);
                let per_period = objective_income(&self.board, faction, amount);
                let income = Resources::try_from(periods)
                    .unwrap_or(Resources::MAX)
                    .saturating_mul(per_period);
                if income > 0 {
                    self.economy_mut(faction)?.credit(income);
                    debug!("{faction} 據點收入 {income}");
                    outcome.income.push((faction, income));
                }
            }
        }
        Ok(outcome)
    }

    /// 取消目前的選擇
    pub fn cancel_selection(&mut self) -> Result<()> {
        self.ensure_running()?;
        if matches!(self.phase, Phase::UnitSelected(_)) {
            self.phase = Phase::AwaitingSelection;
        }
        Ok(())
    }

    /// 點擊格子
    ///
    /// - 尚未選擇：選擇該格的單位
    /// - 已選擇：可移動格 → 移動；可攻擊格 → 攻擊；其他可操作的單位 → 改選；其他格子 → 取消
    pub fn click(&mut self, pos: Position) -> Result<ClickOutcome> {
        self.ensure_running()?;
        let Phase::UnitSelected(selection) = &self.phase else {
            return self.select_unit(pos).map(ClickOutcome::Selected);
        };

        let from = selection.pos;
        if selection.reachable.contains(&pos) {
            return self.move_unit(from, pos).map(ClickOutcome::Moved);
        }
        if selection.targets.contains(&pos) {
            return self.attack(from, pos).map(ClickOutcome::Attacked);
        }
        if pos != from && self.acting_unit(pos).is_ok() {
            return self.select_unit(pos).map(ClickOutcome::Selected);
        }
        self.cancel_selection()?;
        Ok(ClickOutcome::Cancelled)
    }

    fn is_per_turn(&self) -> bool {
        matches!(self.config.ruleset.action_economy, ActionEconomy::PerTurn)
    }

    /// 取得可由目前行動方操作的單位
    fn acting_unit(&self, pos: Position) -> Result<&Unit> {
        self.board.tile_at(pos)?;
        let unit = self
            .board
            .unit_at(pos)
            .ok_or(CommandError::EmptyTile { pos })?;
        if self.is_per_turn() && unit.faction != self.current_faction {
            return Err(CommandError::NotYourTurn {
                faction: unit.faction,
                current: self.current_faction,
            }
            .into());
        }
        Ok(unit)
    }

    fn has_action_left(&self, unit: &Unit) -> bool {
        if self.is_per_turn() {
            !unit.is_exhausted()
        } else {
            self.economy(unit.faction)
                .is_some_and(|economy| economy.action_points > 0)
        }
    }

    /// 行動點制不限制單位的移動或攻擊次數，只看陣營行動點
    fn ensure_slot_available(&self, unit: &Unit, slot_used: bool) -> Result<()> {
        if !self.has_action_left(unit) {
            return Err(CommandError::NoActionsLeft { pos: unit.position }.into());
        }
        if self.is_per_turn() && slot_used {
            return Err(CommandError::AlreadyActed { pos: unit.position }.into());
        }
        Ok(())
    }

    fn consume_action_point(&mut self, faction: Faction) -> Result<()> {
        if !self.is_per_turn() {
            self.economy_mut(faction)?.spend_action_point();
        }
        Ok(())
    }
}

impl fmt::Display for CommandOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandOutcome::Selected(selection) => write!(f, "已選擇 {}", selection.pos),
            CommandOutcome::Moved(outcome) => fmt::Display::fmt(outcome, f),
            CommandOutcome::Attacked(outcome) => fmt::Display::fmt(outcome, f),
            CommandOutcome::Captured(outcome) => match outcome.progress {
                CaptureProgress::Progressed { progress } => {
                    write!(f, "{} 佔領進度 {progress}%", outcome.pos)
                }
                CaptureProgress::Captured { .. } => {
                    write!(f, "{}佔領了 {}", outcome.faction, outcome.pos)
                }
            },
            CommandOutcome::Purchased(outcome) => write!(
                f,
                "在 {} 購買了 {}，剩餘資源 {}",
                outcome.pos, outcome.kind, outcome.remaining
            ),
            CommandOutcome::TurnEnded(outcome) => {
                write!(f, "第 {} 輪，輪到{}", outcome.turn, outcome.current)
            }
            CommandOutcome::Ticked(_) => write!(f, "時間推進"),
            CommandOutcome::Cancelled => write!(f, "已取消選擇"),
            CommandOutcome::Clicked(click) => match click {
                ClickOutcome::Selected(selection) => write!(f, "已選擇 {}", selection.pos),
                ClickOutcome::Moved(outcome) => fmt::Display::fmt(outcome, f),
                ClickOutcome::Attacked(outcome) => fmt::Display::fmt(outcome, f),
                ClickOutcome::Cancelled => write!(f, "已取消選擇"),
            },
        }
    }
}

impl fmt::Display for MoveOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "從 {} 移動到 {}", self.from, self.to)
    }
}

impl fmt::Display for AttackOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "對 {} 造成 {} 傷害", self.target, self.damage)?;
        match self.defender {
            DefenderState::Remaining(health) => write!(f, "，剩餘血量 {health}")?,
            DefenderState::Destroyed => write!(f, "，目標被擊毀")?,
        }
        if let Some(winner) = self.winner {
            write!(f, "。遊戲結束，勝利者為{winner}")?;
        }
        Ok(())
    }
}
