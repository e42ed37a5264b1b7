/// # Summary
/// 可回绕的有限字段序列，`[A, B, C]` 依次产出 `A, B, C, A, ...`。
///
/// # Invariants
/// - 游标始终指向下一次要产出的字段。
/// - 空序列永远产出 `None`。
#[derive(Debug, Clone, Default)]
pub struct FieldCycle {
    // 有序字段名
    fields: Vec<String>,
    // 下一个字段的位置
    cursor: usize,
}

impl FieldCycle {
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields, cursor: 0 }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// 回到序列开头。
    pub fn restart(&mut self) {
        self.cursor = 0;
    }

    /// # Summary
    /// 产出下一个字段并推进游标，越过末尾时回绕到开头。
    pub fn advance(&mut self) -> Option<&str> {
        let len = self.fields.len();
        if len == 0 {
            return None;
        }
        let index = self.cursor;
        self.cursor = (self.cursor + 1) % len;
        self.fields.get(index).map(String::as_str)
    }
}
