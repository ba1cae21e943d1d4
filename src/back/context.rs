//! The compilation context: scopes and symbols, the stack-frame bump
//! allocator, register pools, rodata pools, and label minting.
//!
//! One context lives for one compilation.  The code generator threads an
//! exclusive reference through every handler; nothing here is shared.

use std::fmt::Write;

use derive_more::Display;

use crate::common::{Id, Map, Set};
use crate::front::types::{Type, POINTER_SIZE};

/// Every function reserves this much stack on entry.
pub const TOTAL_STACK_SIZE: i32 = 1024;

/// The top 8 bytes of the frame hold the saved `ra` and `s0`, so locals may
/// only use the bytes below them.
pub const LOCAL_AREA_SIZE: i32 = TOTAL_STACK_SIZE - 8;

/// Integer register pool, in allocation order.
const INT_REGISTERS: [&str; 15] = [
    "t0", "t1", "t2", "t3", "t4", "t5", "t6", "a0", "a1", "a2", "a3", "a4", "a5", "a6", "a7",
];

/// Floating-point register pool, in allocation order.
const FLOAT_REGISTERS: [&str; 16] = [
    "ft0", "ft1", "ft2", "ft3", "ft4", "ft5", "ft6", "ft7", "fa0", "fa1", "fa2", "fa3", "fa4",
    "fa5", "fa6", "fa7",
];

/// Errors raised during code generation.  All of them abort the compilation.
#[derive(Display)]
pub enum CodegenError {
    #[display("variable '{_0}' already declared in current scope")]
    Redeclaration(Id),
    #[display("undefined variable '{_0}'")]
    UndefinedVariable(Id),
    #[display("no free {_0} registers available")]
    RegisterExhaustion(&'static str),
    #[display("cannot exit the global scope")]
    ScopeUnderflow,
    #[display("stack overflow: frame locals exceed {LOCAL_AREA_SIZE} bytes")]
    StackOverflow,
    #[display("unsupported construct: {_0}")]
    Unsupported(String),
    #[display("unknown function '{_0}'")]
    UnknownFunction(Id),
    #[display("unknown enum value '{_0}'")]
    UnknownEnumValue(Id),
    #[display("no end label for function '{_0}'")]
    UnknownEndLabel(Id),
    #[display("not inside a function")]
    NotInFunction,
    #[display("assembly sink error")]
    Sink,
}

impl std::fmt::Debug for CodegenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self}")
    }
}

impl From<std::fmt::Error> for CodegenError {
    fn from(_: std::fmt::Error) -> Self {
        CodegenError::Sink
    }
}

/// A declared name, as stored in a scope.
#[derive(Clone, Copy, Debug)]
pub struct Variable {
    /// Byte offset from `s0`, or a positive `sp`-relative offset for a
    /// stack-passed parameter.  Meaningless for globals.
    pub stack_offset: i32,
    pub ty: Type,
    /// Base type behind the pointer, when `is_pointer`.
    pub pointee: Type,
    pub is_parameter: bool,
    pub is_pointer: bool,
    pub is_array: bool,
    pub is_stack_param: bool,
    pub array_size: i32,
}

impl Variable {
    fn scalar(offset: i32, ty: Type, is_parameter: bool, is_pointer: bool) -> Self {
        Variable {
            stack_offset: offset,
            ty,
            pointee: if is_pointer { ty } else { Type::Void },
            is_parameter,
            is_pointer,
            is_array: false,
            is_stack_param: false,
            array_size: 0,
        }
    }
}

/// An enum definition: enumerator names mapped to integer constants.
#[derive(Clone, Debug, Default)]
pub struct EnumType {
    pub name: Option<Id>,
    values: Map<Id, i32>,
}

impl EnumType {
    pub fn new(name: Option<Id>) -> Self {
        EnumType {
            name,
            values: Map::new(),
        }
    }

    pub fn add_value(&mut self, name: Id, value: i32) {
        self.values.insert(name, value);
    }

    pub fn values(&self) -> &Map<Id, i32> {
        &self.values
    }
}

/// What the function table records per name.
#[derive(Clone, Debug)]
struct FunctionInfo {
    ret: Type,
    returns_pointer: bool,
    end_label: Option<String>,
}

pub struct Context {
    // scope management; the bottom scope is the global scope
    scopes: Vec<Map<Id, Variable>>,
    function_scopes: Vec<bool>,
    current_function_stack: Vec<Id>,

    // stack frame bump allocator
    used_stack_memory: i32,

    functions: Map<Id, FunctionInfo>,
    enum_types: Map<Id, EnumType>,
    enum_values: Map<Id, i32>,
    array_sizes: Map<Id, i32>,

    // rodata pools, keyed by bit pattern so NaNs intern deterministically
    float_labels: Map<u32, String>,
    double_labels: Map<u64, String>,
    string_labels: Map<String, String>,

    break_targets: Vec<String>,
    continue_targets: Vec<String>,
    switch_values: Vec<String>,

    used_registers: Set<String>,
    used_float_registers: Set<String>,
    saved_registers: Map<String, i32>,
    saved_float_registers: Map<String, i32>,
    last_stack_adjust: i32,

    label_counter: u32,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    pub fn new() -> Self {
        Context {
            scopes: vec![Map::new()],
            function_scopes: vec![false],
            current_function_stack: Vec::new(),
            used_stack_memory: 0,
            functions: Map::new(),
            enum_types: Map::new(),
            enum_values: Map::new(),
            array_sizes: Map::new(),
            float_labels: Map::new(),
            double_labels: Map::new(),
            string_labels: Map::new(),
            break_targets: Vec::new(),
            continue_targets: Vec::new(),
            switch_values: Vec::new(),
            used_registers: Set::new(),
            used_float_registers: Set::new(),
            saved_registers: Map::new(),
            saved_float_registers: Map::new(),
            last_stack_adjust: 0,
            label_counter: 0,
        }
    }

    // ----- scopes -----

    pub fn enter_scope(&mut self, is_function: bool) {
        self.scopes.push(Map::new());
        self.function_scopes.push(is_function);
        if is_function {
            self.used_stack_memory = 0;
        }
    }

    pub fn exit_scope(&mut self) -> Result<(), CodegenError> {
        if self.scopes.len() <= 1 {
            return Err(CodegenError::ScopeUnderflow);
        }
        if self.function_scopes.pop() == Some(true) {
            self.current_function_stack.pop();
        }
        self.scopes.pop();
        Ok(())
    }

    /// 0 at the global scope.
    pub fn scope_depth(&self) -> usize {
        self.scopes.len() - 1
    }

    // ----- stack frame -----

    /// Bump-allocate `size` bytes in the current frame, 4-byte aligned.
    fn get_memory(&mut self, size: i32) -> Result<i32, CodegenError> {
        let size = align4(size);
        if self.used_stack_memory + size > LOCAL_AREA_SIZE {
            return Err(CodegenError::StackOverflow);
        }
        let offset = self.used_stack_memory;
        self.used_stack_memory += size;
        Ok(offset)
    }

    // ----- declarations -----

    pub fn declare_variable(
        &mut self,
        name: Id,
        ty: Type,
        is_pointer: bool,
    ) -> Result<Variable, CodegenError> {
        self.check_redeclaration(name)?;
        let size = if is_pointer { POINTER_SIZE } else { ty.size() };
        let offset = self.get_memory(size)?;
        let var = Variable::scalar(offset, ty, false, is_pointer);
        self.innermost().insert(name, var);
        Ok(var)
    }

    /// Globals are addressed by label, so they take no frame space.
    pub fn declare_global_variable(
        &mut self,
        name: Id,
        ty: Type,
        is_pointer: bool,
    ) -> Result<Variable, CodegenError> {
        if self.scopes[0].contains_key(&name) {
            return Err(CodegenError::Redeclaration(name));
        }
        let var = Variable::scalar(0, ty, false, is_pointer);
        self.scopes[0].insert(name, var);
        Ok(var)
    }

    pub fn declare_array(
        &mut self,
        name: Id,
        elem_ty: Type,
        count: i32,
    ) -> Result<Variable, CodegenError> {
        self.check_redeclaration(name)?;
        let offset = self.get_memory(elem_ty.size() * count)?;
        let mut var = Variable::scalar(offset, elem_ty, false, false);
        var.is_array = true;
        var.array_size = count;
        self.innermost().insert(name, var);
        self.array_sizes.insert(name, count);
        Ok(var)
    }

    pub fn declare_global_array(
        &mut self,
        name: Id,
        elem_ty: Type,
        count: i32,
    ) -> Result<Variable, CodegenError> {
        if self.scopes[0].contains_key(&name) {
            return Err(CodegenError::Redeclaration(name));
        }
        let mut var = Variable::scalar(0, elem_ty, false, false);
        var.is_array = true;
        var.array_size = count;
        self.scopes[0].insert(name, var);
        self.array_sizes.insert(name, count);
        Ok(var)
    }

    /// The first 8 parameters (by position) get frame slots; the rest keep
    /// the caller-provided slot above the frame and are addressed from `sp`.
    pub fn declare_parameter(
        &mut self,
        name: Id,
        ty: Type,
        index: usize,
        is_pointer: bool,
    ) -> Result<Variable, CodegenError> {
        let size = if is_pointer { POINTER_SIZE } else { ty.size() };
        let mut var;
        if index < 8 {
            let offset = self.get_memory(size)?;
            var = Variable::scalar(offset, ty, true, is_pointer);
        } else {
            let offset = TOTAL_STACK_SIZE + (index as i32 - 8) * 4;
            var = Variable::scalar(offset, ty, true, is_pointer);
            var.is_stack_param = true;
        }
        self.innermost().insert(name, var);
        Ok(var)
    }

    /// Unnamed prototype parameters reserve space but bind no name.
    pub fn declare_unnamed_parameter(&mut self, ty: Type) -> Result<(), CodegenError> {
        self.get_memory(ty.size())?;
        Ok(())
    }

    fn check_redeclaration(&self, name: Id) -> Result<(), CodegenError> {
        if self.scopes.last().is_some_and(|s| s.contains_key(&name)) {
            return Err(CodegenError::Redeclaration(name));
        }
        Ok(())
    }

    fn innermost(&mut self) -> &mut Map<Id, Variable> {
        self.scopes.last_mut().expect("global scope always exists")
    }

    // ----- lookup -----

    /// Globals win, then inner scopes outward.
    pub fn find_variable(&self, name: Id) -> Option<Variable> {
        if self.is_global(name) {
            if let Some(var) = self.scopes[0].get(&name) {
                return Some(*var);
            }
        }
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(&name))
            .copied()
    }

    pub fn is_global(&self, name: Id) -> bool {
        self.scopes[0].contains_key(&name) && !self.functions.contains_key(&name)
    }

    pub fn variable_type(&self, name: Id) -> Result<Type, CodegenError> {
        self.find_variable(name)
            .map(|v| v.ty)
            .ok_or(CodegenError::UndefinedVariable(name))
    }

    pub fn array_size(&self, name: Id) -> i32 {
        self.array_sizes.get(&name).copied().unwrap_or(1)
    }

    // ----- functions -----

    pub fn set_function_return_type(&mut self, name: Id, ret: Type, returns_pointer: bool) {
        let info = self.functions.entry(name).or_insert(FunctionInfo {
            ret,
            returns_pointer,
            end_label: None,
        });
        info.ret = ret;
        info.returns_pointer = returns_pointer;
    }

    pub fn function_return_type(&self, name: Id) -> Result<Type, CodegenError> {
        self.functions
            .get(&name)
            .map(|info| info.ret)
            .ok_or(CodegenError::UnknownFunction(name))
    }

    pub fn function_exists(&self, name: Id) -> bool {
        self.functions.contains_key(&name)
    }

    pub fn current_function(&self) -> Result<Id, CodegenError> {
        self.current_function_stack
            .last()
            .copied()
            .ok_or(CodegenError::NotInFunction)
    }

    pub fn function_end_label(&self, name: Id) -> Result<String, CodegenError> {
        self.functions
            .get(&name)
            .and_then(|info| info.end_label.clone())
            .ok_or(CodegenError::UnknownEndLabel(name))
    }

    /// Register the function, mint its end label, enter the function scope,
    /// and emit the fixed 1024-byte prologue.
    pub fn begin_function(
        &mut self,
        out: &mut String,
        name: Id,
        ret: Type,
        returns_pointer: bool,
    ) -> Result<(), CodegenError> {
        self.set_function_return_type(name, ret, returns_pointer);
        let end_label = self.generate_unique_label("func_end");
        if let Some(info) = self.functions.get_mut(&name) {
            info.end_label = Some(end_label);
        }
        self.current_function_stack.push(name);
        self.enter_scope(true);

        writeln!(out, "    addi sp, sp, -{TOTAL_STACK_SIZE}")?;
        writeln!(out, "    sw ra, {}(sp)", TOTAL_STACK_SIZE - 4)?;
        writeln!(out, "    sw s0, {}(sp)", TOTAL_STACK_SIZE - 8)?;
        writeln!(out, "    mv s0, sp")?;
        Ok(())
    }

    /// Emit the end label and epilogue, then leave the function scope.
    pub fn end_function(&mut self, out: &mut String, name: Id) -> Result<(), CodegenError> {
        let end_label = self.function_end_label(name)?;
        writeln!(out, "{end_label}:")?;
        writeln!(out, "    mv sp, s0")?;
        writeln!(out, "    lw s0, {}(sp)", TOTAL_STACK_SIZE - 8)?;
        writeln!(out, "    lw ra, {}(sp)", TOTAL_STACK_SIZE - 4)?;
        writeln!(out, "    addi sp, sp, {TOTAL_STACK_SIZE}")?;
        writeln!(out, "    jr ra")?;
        self.exit_scope()
    }

    // ----- registers -----

    /// First free integer register, skipping `exclude`.  Pass a sink to also
    /// zero-initialize the register.
    pub fn allocate_register(
        &mut self,
        exclude: &[&str],
        out: Option<&mut String>,
    ) -> Result<String, CodegenError> {
        for reg in INT_REGISTERS {
            if !self.used_registers.contains(reg) && !exclude.contains(&reg) {
                self.used_registers.insert(reg.to_string());
                if let Some(out) = out {
                    writeln!(out, "    mv {reg}, zero")?;
                }
                return Ok(reg.to_string());
            }
        }
        Err(CodegenError::RegisterExhaustion("integer"))
    }

    pub fn allocate_float_register(
        &mut self,
        exclude: &[&str],
        out: Option<&mut String>,
    ) -> Result<String, CodegenError> {
        for reg in FLOAT_REGISTERS {
            if !self.used_float_registers.contains(reg) && !exclude.contains(&reg) {
                self.used_float_registers.insert(reg.to_string());
                if let Some(out) = out {
                    // zeroing goes through an integer temporary
                    let temp = self.allocate_register(exclude, None)?;
                    writeln!(out, "    mv {temp}, zero")?;
                    writeln!(out, "    fcvt.s.w {reg}, {temp}")?;
                    self.free_register(&temp);
                }
                return Ok(reg.to_string());
            }
        }
        Err(CodegenError::RegisterExhaustion("floating-point"))
    }

    pub fn free_register(&mut self, reg: &str) {
        self.used_registers.remove(reg);
    }

    pub fn free_float_register(&mut self, reg: &str) {
        self.used_float_registers.remove(reg);
    }

    /// Free a register of either class, judged by its name.
    pub fn release_register(&mut self, reg: &str) {
        if reg.starts_with('f') {
            self.free_float_register(reg);
        } else {
            self.free_register(reg);
        }
    }

    fn float_save_width(&self, reg: &str) -> i32 {
        // `fa*` registers of a double-returning function carry doubles
        let double = reg.starts_with("fa")
            && self
                .current_function()
                .and_then(|f| self.function_return_type(f))
                .map(|ret| ret == Type::Double)
                .unwrap_or(false);
        if double {
            8
        } else {
            4
        }
    }

    /// Spill every currently allocated caller-saved register to a fresh
    /// 16-byte-aligned area below `sp`.  Does nothing when none are live.
    pub fn save_registers(&mut self, out: &mut String) -> Result<(), CodegenError> {
        let mut total = 4 * self.used_registers.len() as i32;
        for reg in &self.used_float_registers {
            total += self.float_save_width(reg);
        }
        total = align16(total);

        if total == 0 {
            self.last_stack_adjust = 0;
            return Ok(());
        }

        writeln!(out, "    addi sp, sp, -{total}")?;
        self.last_stack_adjust = total;

        let mut offset = 0;
        let int_regs: Vec<String> = self.used_registers.iter().cloned().collect();
        for reg in int_regs {
            writeln!(out, "    sw {reg}, {offset}(sp)")?;
            self.saved_registers.insert(reg, offset);
            offset += 4;
        }
        let float_regs: Vec<String> = self.used_float_registers.iter().cloned().collect();
        for reg in float_regs {
            if self.float_save_width(&reg) == 8 {
                writeln!(out, "    fsd {reg}, {offset}(sp)")?;
                self.saved_float_registers.insert(reg, offset);
                offset += 8;
            } else {
                writeln!(out, "    fsw {reg}, {offset}(sp)")?;
                self.saved_float_registers.insert(reg, offset);
                offset += 4;
            }
        }
        Ok(())
    }

    /// Reload what `save_registers` spilled and pop the save area.
    pub fn restore_registers(&mut self, out: &mut String) -> Result<(), CodegenError> {
        let saved: Vec<(String, i32)> = self
            .saved_registers
            .iter()
            .map(|(r, o)| (r.clone(), *o))
            .collect();
        for (reg, offset) in saved {
            writeln!(out, "    lw {reg}, {offset}(sp)")?;
        }
        let saved_floats: Vec<(String, i32)> = self
            .saved_float_registers
            .iter()
            .map(|(r, o)| (r.clone(), *o))
            .collect();
        for (reg, offset) in saved_floats {
            if self.float_save_width(&reg) == 8 {
                writeln!(out, "    fld {reg}, {offset}(sp)")?;
            } else {
                writeln!(out, "    flw {reg}, {offset}(sp)")?;
            }
        }
        if self.last_stack_adjust > 0 {
            writeln!(out, "    addi sp, sp, {}", self.last_stack_adjust)?;
        }
        self.saved_registers.clear();
        self.saved_float_registers.clear();
        Ok(())
    }

    // ----- frame-relative loads and stores -----

    pub fn load_variable(
        &self,
        out: &mut String,
        reg: &str,
        name: Id,
    ) -> Result<(), CodegenError> {
        let var = self
            .find_variable(name)
            .ok_or(CodegenError::UndefinedVariable(name))?;

        // stack-passed parameters sit above the frame, addressed from sp
        let base = if var.is_parameter && var.is_stack_param {
            "sp"
        } else {
            "s0"
        };
        let op = match var.ty {
            Type::Float if !var.is_pointer => "flw",
            Type::Double if !var.is_pointer => "fld",
            Type::Char if !var.is_pointer => "lbu",
            _ => "lw",
        };
        writeln!(out, "    {op} {reg}, {}({base})", var.stack_offset)?;
        Ok(())
    }

    pub fn store_variable(
        &self,
        out: &mut String,
        reg: &str,
        name: Id,
    ) -> Result<(), CodegenError> {
        let var = self
            .find_variable(name)
            .ok_or(CodegenError::UndefinedVariable(name))?;

        let base = if var.is_parameter && var.is_stack_param {
            "sp"
        } else {
            "s0"
        };
        let op = match var.ty {
            Type::Float if !var.is_pointer => "fsw",
            Type::Double if !var.is_pointer => "fsd",
            Type::Char if !var.is_pointer => "sb",
            _ => "sw",
        };
        writeln!(out, "    {op} {reg}, {}({base})", var.stack_offset)?;
        Ok(())
    }

    // ----- labels and rodata -----

    pub fn generate_unique_label(&mut self, prefix: &str) -> String {
        let label = format!("{prefix}_{}", self.label_counter);
        self.label_counter += 1;
        label
    }

    /// Intern a float constant; one label per distinct bit pattern.
    pub fn float_label(&mut self, value: f32) -> String {
        let next = self.float_labels.len() + 1;
        self.float_labels
            .entry(value.to_bits())
            .or_insert_with(|| format!(".FLC_{next}"))
            .clone()
    }

    pub fn double_label(&mut self, value: f64) -> String {
        let next = self.double_labels.len() + 1;
        self.double_labels
            .entry(value.to_bits())
            .or_insert_with(|| format!(".DLC_{next}"))
            .clone()
    }

    pub fn string_label(&mut self, value: &str) -> String {
        let next = self.string_labels.len() + 1;
        self.string_labels
            .entry(value.to_string())
            .or_insert_with(|| format!(".SLC_{next}"))
            .clone()
    }

    pub fn emit_float_data(&self, out: &mut String) -> Result<(), CodegenError> {
        for (bits, label) in &self.float_labels {
            writeln!(out, "{label}:")?;
            writeln!(out, "    .word {bits}")?;
        }
        Ok(())
    }

    /// Doubles go in `.rodata` as two little-endian words.
    pub fn emit_double_data(&self, out: &mut String) -> Result<(), CodegenError> {
        if self.double_labels.is_empty() {
            return Ok(());
        }
        writeln!(out, "    .section    .rodata")?;
        for (bits, label) in &self.double_labels {
            writeln!(out, "{label}:")?;
            writeln!(out, "    .word {}", *bits as u32)?;
            writeln!(out, "    .word {}", (*bits >> 32) as u32)?;
        }
        Ok(())
    }

    pub fn emit_string_data(&self, out: &mut String) -> Result<(), CodegenError> {
        for (value, label) in &self.string_labels {
            writeln!(out, "{label}:")?;
            writeln!(out, "    .string {value}")?;
        }
        Ok(())
    }

    // ----- loop and switch targets -----

    pub fn push_break_target(&mut self, label: String) {
        self.break_targets.push(label);
    }

    pub fn pop_break_target(&mut self) {
        self.break_targets.pop();
    }

    pub fn current_break_target(&self) -> Option<&str> {
        self.break_targets.last().map(|s| s.as_str())
    }

    pub fn push_continue_target(&mut self, label: String) {
        self.continue_targets.push(label);
    }

    pub fn pop_continue_target(&mut self) {
        self.continue_targets.pop();
    }

    pub fn current_continue_target(&self) -> Option<&str> {
        self.continue_targets.last().map(|s| s.as_str())
    }

    pub fn push_switch_value(&mut self, reg: String) {
        self.switch_values.push(reg);
    }

    pub fn pop_switch_value(&mut self) {
        self.switch_values.pop();
    }

    pub fn current_switch_value(&self) -> Option<&str> {
        self.switch_values.last().map(|s| s.as_str())
    }

    // ----- enums -----

    pub fn add_enum(&mut self, enum_type: EnumType) {
        for (name, value) in enum_type.values() {
            self.enum_values.insert(*name, *value);
        }
        if let Some(name) = enum_type.name {
            self.enum_types.insert(name, enum_type);
        }
    }

    pub fn is_enum_value(&self, name: Id) -> bool {
        self.enum_values.contains_key(&name)
    }

    pub fn enum_value(&self, name: Id) -> Result<i32, CodegenError> {
        self.enum_values
            .get(&name)
            .copied()
            .ok_or(CodegenError::UnknownEnumValue(name))
    }
}

fn align4(size: i32) -> i32 {
    (size + 3) / 4 * 4
}

fn align16(size: i32) -> i32 {
    (size + 15) / 16 * 16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::id;

    #[test]
    fn exit_global_scope_is_fatal() {
        let mut ctx = Context::new();
        assert!(matches!(ctx.exit_scope(), Err(CodegenError::ScopeUnderflow)));
        ctx.enter_scope(false);
        assert!(ctx.exit_scope().is_ok());
        assert!(ctx.exit_scope().is_err());
    }

    #[test]
    fn redeclaration_in_same_scope_is_fatal() {
        let mut ctx = Context::new();
        ctx.enter_scope(true);
        ctx.declare_variable(id("x"), Type::Int, false).unwrap();
        assert!(matches!(
            ctx.declare_variable(id("x"), Type::Int, false),
            Err(CodegenError::Redeclaration(_))
        ));
        // shadowing in an inner scope is fine
        ctx.enter_scope(false);
        assert!(ctx.declare_variable(id("x"), Type::Int, false).is_ok());
    }

    #[test]
    fn bump_allocator_aligns_to_four() {
        let mut ctx = Context::new();
        ctx.enter_scope(true);
        let c = ctx.declare_variable(id("c"), Type::Char, false).unwrap();
        let i = ctx.declare_variable(id("i"), Type::Int, false).unwrap();
        assert_eq!(c.stack_offset, 0);
        assert_eq!(i.stack_offset, 4);
        let d = ctx.declare_variable(id("d"), Type::Double, false).unwrap();
        assert_eq!(d.stack_offset, 8);
    }

    #[test]
    fn frame_overflow_is_fatal() {
        let mut ctx = Context::new();
        ctx.enter_scope(true);
        // 254 ints consume 1016 bytes; one more overflows into the ra/s0 area
        for n in 0..254 {
            let name = id(&format!("v{n}"));
            let var = ctx.declare_variable(name, Type::Int, false).unwrap();
            assert!(var.stack_offset < LOCAL_AREA_SIZE);
            assert_eq!(var.stack_offset % 4, 0);
        }
        assert!(matches!(
            ctx.declare_variable(id("last"), Type::Int, false),
            Err(CodegenError::StackOverflow)
        ));
    }

    #[test]
    fn frame_resets_at_function_boundary() {
        let mut ctx = Context::new();
        ctx.enter_scope(true);
        ctx.declare_variable(id("a"), Type::Int, false).unwrap();
        ctx.exit_scope().unwrap();
        ctx.enter_scope(true);
        let b = ctx.declare_variable(id("b"), Type::Int, false).unwrap();
        assert_eq!(b.stack_offset, 0);
    }

    #[test]
    fn unnamed_parameters_still_consume_frame_space() {
        let mut ctx = Context::new();
        ctx.enter_scope(true);
        ctx.declare_unnamed_parameter(Type::Char).unwrap();
        let next = ctx.declare_variable(id("x"), Type::Int, false).unwrap();
        assert_eq!(next.stack_offset, 4);
    }

    #[test]
    fn stack_parameters_sit_above_the_frame() {
        let mut ctx = Context::new();
        ctx.enter_scope(true);
        let p8 = ctx
            .declare_parameter(id("i"), Type::Int, 8, false)
            .unwrap();
        let p9 = ctx
            .declare_parameter(id("j"), Type::Int, 9, false)
            .unwrap();
        assert!(p8.is_stack_param);
        assert_eq!(p8.stack_offset, 1024);
        assert_eq!(p9.stack_offset, 1028);
        // register parameters keep using frame slots
        let p0 = ctx
            .declare_parameter(id("a"), Type::Int, 0, false)
            .unwrap();
        assert!(!p0.is_stack_param);
        assert_eq!(p0.stack_offset, 0);
    }

    #[test]
    fn array_allocation_pads_to_word() {
        let mut ctx = Context::new();
        ctx.enter_scope(true);
        ctx.declare_array(id("s"), Type::Char, 5).unwrap();
        let next = ctx.declare_variable(id("x"), Type::Int, false).unwrap();
        assert_eq!(next.stack_offset, 8);
    }

    #[test]
    fn register_pool_is_first_fit() {
        let mut ctx = Context::new();
        assert_eq!(ctx.allocate_register(&[], None).unwrap(), "t0");
        assert_eq!(ctx.allocate_register(&["t1"], None).unwrap(), "t2");
        ctx.free_register("t0");
        assert_eq!(ctx.allocate_register(&[], None).unwrap(), "t0");
    }

    #[test]
    fn register_pool_exhausts() {
        let mut ctx = Context::new();
        for _ in 0..15 {
            ctx.allocate_register(&[], None).unwrap();
        }
        assert!(matches!(
            ctx.allocate_register(&[], None),
            Err(CodegenError::RegisterExhaustion(_))
        ));
    }

    #[test]
    fn float_pool_is_separate() {
        let mut ctx = Context::new();
        assert_eq!(ctx.allocate_float_register(&[], None).unwrap(), "ft0");
        assert_eq!(ctx.allocate_register(&[], None).unwrap(), "t0");
        ctx.free_float_register("ft0");
        assert_eq!(ctx.allocate_float_register(&[], None).unwrap(), "ft0");
    }

    #[test]
    fn zero_initialized_allocation_emits_mv() {
        let mut ctx = Context::new();
        let mut out = String::new();
        let reg = ctx.allocate_register(&[], Some(&mut out)).unwrap();
        assert_eq!(out, format!("    mv {reg}, zero\n"));
    }

    #[test]
    fn unique_labels_increment() {
        let mut ctx = Context::new();
        assert_eq!(ctx.generate_unique_label("if_else"), "if_else_0");
        assert_eq!(ctx.generate_unique_label("if_end"), "if_end_1");
    }

    #[test]
    fn rodata_interning_is_per_value() {
        let mut ctx = Context::new();
        let a = ctx.float_label(1.5);
        let b = ctx.float_label(1.5);
        let c = ctx.float_label(2.5);
        assert_eq!(a, b);
        assert_ne!(a, c);

        let mut out = String::new();
        ctx.emit_float_data(&mut out).unwrap();
        assert_eq!(out.matches(&format!("{a}:")).count(), 1);
    }

    #[test]
    fn double_rodata_words_are_little_endian() {
        let mut ctx = Context::new();
        let label = ctx.double_label(1.0);
        let mut out = String::new();
        ctx.emit_double_data(&mut out).unwrap();
        let bits = 1.0f64.to_bits();
        let expected = format!(
            "    .section    .rodata\n{label}:\n    .word {}\n    .word {}\n",
            bits as u32,
            (bits >> 32) as u32
        );
        assert_eq!(out, expected);
    }

    #[test]
    fn break_and_continue_track_innermost() {
        let mut ctx = Context::new();
        ctx.push_break_target("outer_end".to_string());
        ctx.push_break_target("inner_end".to_string());
        assert_eq!(ctx.current_break_target(), Some("inner_end"));
        ctx.pop_break_target();
        assert_eq!(ctx.current_break_target(), Some("outer_end"));
        assert_eq!(ctx.current_continue_target(), None);
    }

    #[test]
    fn save_registers_is_noop_when_nothing_live() {
        let mut ctx = Context::new();
        let mut out = String::new();
        ctx.save_registers(&mut out).unwrap();
        ctx.restore_registers(&mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn save_and_restore_round_trip() {
        let mut ctx = Context::new();
        let reg = ctx.allocate_register(&[], None).unwrap();
        let mut out = String::new();
        ctx.save_registers(&mut out).unwrap();
        assert!(out.contains("addi sp, sp, -16"));
        assert!(out.contains(&format!("sw {reg}, 0(sp)")));
        ctx.restore_registers(&mut out).unwrap();
        assert!(out.contains(&format!("lw {reg}, 0(sp)")));
        assert!(out.contains("addi sp, sp, 16"));
    }

    #[test]
    fn enum_values_resolve() {
        let mut ctx = Context::new();
        let mut colors = EnumType::new(Some(id("Color")));
        colors.add_value(id("RED"), 0);
        colors.add_value(id("BLUE"), 5);
        ctx.add_enum(colors);
        assert!(ctx.is_enum_value(id("BLUE")));
        assert_eq!(ctx.enum_value(id("BLUE")).unwrap(), 5);
        assert!(ctx.enum_value(id("GREEN")).is_err());
    }

    #[test]
    fn globals_take_no_frame_space() {
        let mut ctx = Context::new();
        ctx.declare_global_array(id("table"), Type::Int, 100).unwrap();
        ctx.enter_scope(true);
        let local = ctx.declare_variable(id("x"), Type::Int, false).unwrap();
        assert_eq!(local.stack_offset, 0);
        assert!(ctx.is_global(id("table")));
        assert_eq!(ctx.array_size(id("table")), 100);
    }
}
