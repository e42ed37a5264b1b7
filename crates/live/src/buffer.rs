use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// 一次轮转的结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationOutcome {
    // 活跃分区的队首元素移到了溢出分区队尾
    Moved,
    // 活跃分区已空，两个分区互换角色
    Swapped,
    // 两个分区均为空
    Idle,
}

/// # Summary
/// 双分区轮转缓冲区，用于模拟 "实时" 滚动的数据。
///
/// # Invariants
/// - `active` 与 `overflow` 互不相交，二者之并始终是完整的记录集合。
/// - 每次 `tick` 后总长度不变，不丢失、不重复。
/// - 元素只追加到分区队尾，分区内相对顺序保持不变。
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RotationBuffer<T> {
    // 当前参与渲染的分区
    active: VecDeque<T>,
    // 已移出的分区，按移出顺序排列
    overflow: VecDeque<T>,
}

impl<T> RotationBuffer<T> {
    /// # Summary
    /// 以全部记录作为活跃分区创建缓冲区。
    ///
    /// # Arguments
    /// * `records`: 初始记录，保持给定顺序。
    ///
    /// # Returns
    /// 溢出分区为空的缓冲区。
    pub fn new(records: Vec<T>) -> Self {
        Self::with_partitions(records, Vec::new())
    }

    /// 以给定的两个分区创建缓冲区。
    pub fn with_partitions(active: Vec<T>, overflow: Vec<T>) -> Self {
        Self {
            active: active.into(),
            overflow: overflow.into(),
        }
    }

    /// # Summary
    /// 推进一步轮转。
    ///
    /// # Logic
    /// 1. 活跃分区非空：弹出队首并追加到溢出分区队尾。
    /// 2. 活跃分区为空：交换两个分区的角色，使轮转可以无限持续。
    /// 3. 两者皆空：不做任何事。
    ///
    /// # Returns
    /// 本次轮转的结果。
    pub fn tick(&mut self) -> RotationOutcome {
        if let Some(front) = self.active.pop_front() {
            self.overflow.push_back(front);
            RotationOutcome::Moved
        } else if !self.overflow.is_empty() {
            std::mem::swap(&mut self.active, &mut self.overflow);
            RotationOutcome::Swapped
        } else {
            RotationOutcome::Idle
        }
    }

    pub fn active(&self) -> impl ExactSizeIterator<Item = &T> + '_ {
        self.active.iter()
    }

    pub fn overflow(&self) -> impl ExactSizeIterator<Item = &T> + '_ {
        self.overflow.iter()
    }

    /// 两个分区的总长度。
    pub fn len(&self) -> usize {
        self.active.len() + self.overflow.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty() && self.overflow.is_empty()
    }
}

impl<T: Clone> RotationBuffer<T> {
    /// 按顺序克隆活跃分区，作为渲染用的工作集。
    pub fn active_vec(&self) -> Vec<T> {
        self.active.iter().cloned().collect()
    }
}
