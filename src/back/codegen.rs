//! The code generator: a structural walk of the typed AST that writes RV32
//! GAS assembly.
//!
//! Every expression handler returns the name of the register holding its
//! value; freeing that register is the consumer's responsibility.  Statement
//! handlers emit control flow and release whatever their subexpressions
//! published.

use std::fmt::Write;

use crate::common::Id;
use crate::front::ast::*;
use crate::front::types::Type;

use super::context::{CodegenError, Context, EnumType, Variable};

/// Compile a parsed translation unit to assembly text, rodata included.
pub fn generate(program: &Program) -> Result<String, CodegenError> {
    let mut gen = CodeGen::new();
    for decl in &program.decls {
        gen.gen_decl(decl)?;
    }
    gen.finish()
}

struct CodeGen {
    ctx: Context,
    out: String,
    /// Fall-through entry point of the following `case`, deferred so that a
    /// case body runs straight into the next case's body.
    pending_next_case: Option<String>,
}

/// Collapse the width variants onto the four classes the emitter knows.
fn scalar_class(ty: Type) -> Type {
    match ty {
        Type::Float | Type::Double | Type::Char => ty,
        _ => Type::Int,
    }
}

impl CodeGen {
    fn new() -> Self {
        CodeGen {
            ctx: Context::new(),
            out: String::new(),
            pending_next_case: None,
        }
    }

    fn finish(mut self) -> Result<String, CodegenError> {
        self.ctx.emit_float_data(&mut self.out)?;
        self.ctx.emit_double_data(&mut self.out)?;
        self.ctx.emit_string_data(&mut self.out)?;
        Ok(self.out)
    }

    fn label(&mut self, prefix: &str) -> String {
        self.ctx.generate_unique_label(prefix)
    }

    fn free(&mut self, reg: &str) {
        self.ctx.release_register(reg);
    }

    // ----- type queries (resolved through the context, never cached on the AST) -----

    /// The scalar type an expression evaluates to.  Pointer-valued
    /// expressions type as `int`: a pointer's value is an address.
    fn expr_type(&self, expr: &Expr) -> Type {
        match expr {
            Expr::IntLiteral(_) => Type::Int,
            Expr::FloatLiteral(_) => Type::Float,
            Expr::DoubleLiteral(_) => Type::Double,
            Expr::CharLiteral(_) => Type::Char,
            Expr::StringLiteral(_) => Type::Char,
            Expr::Identifier(name) => {
                if self.ctx.is_enum_value(*name) {
                    Type::Int
                } else {
                    match self.ctx.find_variable(*name) {
                        Some(var) if !var.is_pointer => var.ty,
                        _ => Type::Int,
                    }
                }
            }
            Expr::Binary { op, lhs, rhs } => {
                if op.is_comparison()
                    || matches!(op, BinaryOp::LogicalAnd | BinaryOp::LogicalOr)
                {
                    Type::Int
                } else {
                    let l = self.expr_type(lhs);
                    let r = self.expr_type(rhs);
                    if l == Type::Double || r == Type::Double {
                        Type::Double
                    } else if l == Type::Float || r == Type::Float {
                        Type::Float
                    } else {
                        Type::Int
                    }
                }
            }
            Expr::Unary { op, operand } => match op {
                UnaryOp::Dereference => self.pointee_type(operand),
                UnaryOp::AddressOf | UnaryOp::LogicalNot | UnaryOp::BitNot => Type::Int,
                _ => self.expr_type(operand),
            },
            Expr::Assignment { op, rhs, .. } => {
                if *op == AssignOp::Assign {
                    self.expr_type(rhs)
                } else {
                    Type::Int
                }
            }
            Expr::Call { callee, .. } => callee
                .as_identifier()
                .and_then(|name| self.ctx.function_return_type(name).ok())
                .unwrap_or(Type::Int),
            Expr::Index { array, .. } => array
                .as_identifier()
                .and_then(|name| self.ctx.find_variable(name))
                .map(|var| var.ty)
                .unwrap_or(Type::Int),
            Expr::Member { .. } | Expr::PointerMember { .. } => Type::Int,
            Expr::Cast { ty, .. } => *ty,
            Expr::Conditional { then_expr, .. } => self.expr_type(then_expr),
            Expr::Comma { rhs, .. } => self.expr_type(rhs),
            Expr::SizeofExpr(_) | Expr::SizeofType(_) => Type::Int,
        }
    }

    /// The type behind a dereferenced pointer identifier; `int` otherwise.
    fn pointee_type(&self, operand: &Expr) -> Type {
        operand
            .as_identifier()
            .and_then(|name| self.ctx.find_variable(name))
            .filter(|var| var.is_pointer)
            .map(|var| var.ty)
            .unwrap_or(Type::Int)
    }

    /// Pointer arithmetic is detected by looking up the operand identifier.
    fn pointer_operand(&self, expr: &Expr) -> Option<Variable> {
        expr.as_identifier()
            .and_then(|name| self.ctx.find_variable(name))
            .filter(|var| var.is_pointer)
    }

    // ----- declarations -----

    fn gen_decl(&mut self, decl: &Decl) -> Result<(), CodegenError> {
        match decl {
            Decl::Variable(var) => {
                if self.ctx.scope_depth() == 0 {
                    self.gen_global_var(var)
                } else {
                    self.gen_local_var(var)
                }
            }
            Decl::Function(func) => self.gen_function(func),
            Decl::Enum(decl) => self.gen_enum(decl),
        }
    }

    fn gen_global_var(&mut self, decl: &VarDecl) -> Result<(), CodegenError> {
        let name = decl.name();
        writeln!(self.out, "    .data")?;
        writeln!(self.out, "    .align 2")?;
        writeln!(self.out, "    .globl {name}")?;
        writeln!(self.out, "{name}:")?;

        if decl.is_array() {
            let count = decl.declarator.array_size().ok_or_else(|| {
                CodegenError::Unsupported(format!(
                    "array '{name}' needs an integer-literal size"
                ))
            })?;
            self.ctx.declare_global_array(name, decl.ty, count)?;
            match &decl.init {
                Some(Initializer::List(exprs)) => {
                    self.emit_global_array_init(decl.ty, count, exprs)?
                }
                Some(Initializer::Expr(_)) => {
                    return Err(CodegenError::Unsupported(format!(
                        "array '{name}' initializer must be a brace list"
                    )))
                }
                None => {
                    let total = (decl.ty.size() * count + 3) / 4 * 4;
                    writeln!(self.out, "    .zero {total}")?;
                }
            }
        } else {
            self.ctx
                .declare_global_variable(name, decl.ty, decl.is_pointer())?;
            match &decl.init {
                Some(Initializer::Expr(expr)) => self.emit_global_scalar_init(name, expr)?,
                Some(Initializer::List(_)) => {
                    return Err(CodegenError::Unsupported(format!(
                        "scalar '{name}' cannot take a brace initializer"
                    )))
                }
                None => {
                    let size = if decl.is_pointer() { 4 } else { decl.ty.size() };
                    writeln!(self.out, "    .zero {size}")?;
                }
            }
        }
        Ok(())
    }

    /// The stored words carry the literal's bit pattern: floats are
    /// bit-punned to one word, doubles to two little-endian words.
    fn emit_global_scalar_init(&mut self, name: Id, expr: &Expr) -> Result<(), CodegenError> {
        match folded_literal(expr) {
            Some(Literal::Int(v)) => writeln!(self.out, "    .word {v}")?,
            Some(Literal::Float(v)) => writeln!(self.out, "    .word {}", v.to_bits())?,
            Some(Literal::Double(v)) => {
                let bits = v.to_bits();
                writeln!(self.out, "    .word {}", bits as u32)?;
                writeln!(self.out, "    .word {}", (bits >> 32) as u32)?;
            }
            Some(Literal::Char(v)) => writeln!(self.out, "    .byte {v}")?,
            None => {
                return Err(CodegenError::Unsupported(format!(
                    "global '{name}' initializer must be a constant"
                )))
            }
        }
        Ok(())
    }

    fn emit_global_array_init(
        &mut self,
        elem_ty: Type,
        count: i32,
        exprs: &[Expr],
    ) -> Result<(), CodegenError> {
        if elem_ty == Type::Char {
            for expr in exprs {
                match folded_literal(expr) {
                    Some(Literal::Int(v)) => writeln!(self.out, "    .byte {v}")?,
                    Some(Literal::Char(v)) => writeln!(self.out, "    .byte {v}")?,
                    _ => writeln!(self.out, "    .byte 0")?,
                }
            }
            for _ in exprs.len()..count.max(0) as usize {
                writeln!(self.out, "    .byte 0")?;
            }
            if count % 4 != 0 {
                writeln!(self.out, "    .align 2")?;
            }
        } else {
            for expr in exprs {
                match folded_literal(expr) {
                    Some(Literal::Int(v)) => writeln!(self.out, "    .word {v}")?,
                    Some(Literal::Float(v)) => writeln!(self.out, "    .word {}", v.to_bits())?,
                    Some(Literal::Double(v)) => {
                        let bits = v.to_bits();
                        writeln!(self.out, "    .word {}", bits as u32)?;
                        writeln!(self.out, "    .word {}", (bits >> 32) as u32)?;
                    }
                    _ => writeln!(self.out, "    .word 0")?,
                }
            }
            for _ in exprs.len()..count.max(0) as usize {
                if elem_ty == Type::Double {
                    writeln!(self.out, "    .word 0")?;
                    writeln!(self.out, "    .word 0")?;
                } else {
                    writeln!(self.out, "    .word 0")?;
                }
            }
        }
        Ok(())
    }

    fn gen_local_var(&mut self, decl: &VarDecl) -> Result<(), CodegenError> {
        let name = decl.name();
        if decl.is_array() {
            let count = decl.declarator.array_size().ok_or_else(|| {
                CodegenError::Unsupported(format!(
                    "array '{name}' needs an integer-literal size"
                ))
            })?;
            let var = self.ctx.declare_array(name, decl.ty, count)?;
            if let Some(init) = &decl.init {
                let Initializer::List(exprs) = init else {
                    return Err(CodegenError::Unsupported(format!(
                        "array '{name}' initializer must be a brace list"
                    )));
                };
                let elem_size = decl.ty.size();
                for (i, expr) in exprs.iter().enumerate() {
                    let value = self.gen_expr(expr)?;
                    let offset = var.stack_offset + i as i32 * elem_size;
                    let op = match decl.ty {
                        Type::Float => "fsw",
                        Type::Double => "fsd",
                        Type::Char => "sb",
                        _ => "sw",
                    };
                    writeln!(self.out, "    {op} {value}, {offset}(s0)")?;
                    self.free(&value);
                }
            }
        } else {
            self.ctx
                .declare_variable(name, decl.ty, decl.is_pointer())?;
            if let Some(init) = &decl.init {
                let Initializer::Expr(expr) = init else {
                    return Err(CodegenError::Unsupported(format!(
                        "scalar '{name}' cannot take a brace initializer"
                    )));
                };
                let value = self.gen_expr(expr)?;
                self.ctx.store_variable(&mut self.out, &value, name)?;
                self.free(&value);
            }
        }
        Ok(())
    }

    fn gen_function(&mut self, decl: &FunctionDecl) -> Result<(), CodegenError> {
        let name = decl.name;
        let Some(body) = &decl.body else {
            // a prototype only registers the return type
            self.ctx
                .set_function_return_type(name, decl.ret, decl.returns_pointer);
            return Ok(());
        };

        writeln!(self.out, "    .text")?;
        writeln!(self.out, "    .align 2")?;
        writeln!(self.out, "    .globl {name}")?;
        writeln!(self.out, "    .type {name}, @function")?;
        writeln!(self.out, "{name}:")?;

        self.ctx
            .begin_function(&mut self.out, name, decl.ret, decl.returns_pointer)?;

        // argument registers are claimed per ABI class, in parameter order
        let mut int_idx = 0;
        let mut float_idx = 0;
        for (i, param) in decl.params.iter().enumerate() {
            let param_name = param.name.ok_or_else(|| {
                CodegenError::Unsupported(format!(
                    "unnamed parameter {i} in the definition of '{name}'"
                ))
            })?;
            let reg = if i >= 8 {
                None
            } else if param.ty.is_floating() && !param.is_pointer {
                let reg = format!("fa{float_idx}");
                float_idx += 1;
                Some(reg)
            } else {
                let reg = format!("a{int_idx}");
                int_idx += 1;
                Some(reg)
            };

            self.ctx
                .declare_parameter(param_name, param.ty, i, param.is_pointer)?;

            // register parameters spill to their frame slot right away;
            // stack parameters stay where the caller put them
            if let Some(reg) = reg {
                self.ctx.store_variable(&mut self.out, &reg, param_name)?;
            }
        }

        self.gen_stmt(body)?;
        self.ctx.end_function(&mut self.out, name)
    }

    fn gen_enum(&mut self, decl: &EnumDecl) -> Result<(), CodegenError> {
        let mut enum_type = EnumType::new(decl.name);
        let mut next = 0;
        for enumerator in &decl.values {
            if let Some(expr) = &enumerator.value {
                next = match folded_literal(expr) {
                    Some(Literal::Int(v)) => v,
                    _ => {
                        return Err(CodegenError::Unsupported(format!(
                            "enumerator '{}' needs an integer constant",
                            enumerator.name
                        )))
                    }
                };
            }
            enum_type.add_value(enumerator.name, next);
            next += 1;
        }
        self.ctx.add_enum(enum_type);
        Ok(())
    }

    // ----- statements -----

    fn gen_stmt(&mut self, stmt: &Stmt) -> Result<(), CodegenError> {
        match stmt {
            Stmt::Expr(expr) => {
                if let Some(expr) = expr {
                    let reg = self.gen_expr(expr)?;
                    self.free(&reg);
                }
                Ok(())
            }
            Stmt::Compound { decls, stmts } => {
                self.ctx.enter_scope(false);
                for decl in decls {
                    self.gen_local_var(decl)?;
                }
                for stmt in stmts {
                    self.gen_stmt(stmt)?;
                }
                self.ctx.exit_scope()
            }
            Stmt::If {
                cond,
                then_stmt,
                else_stmt,
            } => self.gen_if(cond, then_stmt, else_stmt.as_deref()),
            Stmt::While { cond, body } => self.gen_while(cond, body),
            Stmt::DoWhile { body, cond } => self.gen_do_while(body, cond),
            Stmt::For {
                init,
                cond,
                step,
                body,
            } => self.gen_for(init.as_deref(), cond.as_ref(), step.as_ref(), body),
            Stmt::Switch { scrutinee, body } => self.gen_switch(scrutinee, body),
            Stmt::Case { value, stmt } => self.gen_case(value.as_ref(), stmt),
            Stmt::Return(expr) => self.gen_return(expr.as_ref()),
            Stmt::Break => {
                let target = self
                    .ctx
                    .current_break_target()
                    .ok_or_else(|| {
                        CodegenError::Unsupported("break outside of a loop or switch".to_string())
                    })?
                    .to_string();
                writeln!(self.out, "    j {target}")?;
                Ok(())
            }
            Stmt::Continue => {
                let target = self
                    .ctx
                    .current_continue_target()
                    .ok_or_else(|| {
                        CodegenError::Unsupported("continue outside of a loop".to_string())
                    })?
                    .to_string();
                writeln!(self.out, "    j {target}")?;
                Ok(())
            }
            Stmt::Goto(label) => {
                writeln!(self.out, "    j {label}")?;
                Ok(())
            }
            Stmt::Labeled { label, stmt } => {
                writeln!(self.out, "{label}:")?;
                self.gen_stmt(stmt)
            }
        }
    }

    fn gen_if(
        &mut self,
        cond: &Expr,
        then_stmt: &Stmt,
        else_stmt: Option<&Stmt>,
    ) -> Result<(), CodegenError> {
        let cond_reg = self.gen_expr(cond)?;
        let else_label = self.label("if_else");
        let end_label = self.label("if_end");

        writeln!(self.out, "    beqz {cond_reg}, {else_label}")?;
        self.free(&cond_reg);
        self.gen_stmt(then_stmt)?;

        if else_stmt.is_some() {
            writeln!(self.out, "    j {end_label}")?;
        }
        writeln!(self.out, "{else_label}:")?;

        if let Some(else_stmt) = else_stmt {
            self.gen_stmt(else_stmt)?;
            writeln!(self.out, "{end_label}:")?;
        }
        Ok(())
    }

    fn gen_while(&mut self, cond: &Expr, body: &Stmt) -> Result<(), CodegenError> {
        let start_label = self.label("while_start");
        let end_label = self.label("while_end");
        self.ctx.push_break_target(end_label.clone());
        self.ctx.push_continue_target(start_label.clone());

        writeln!(self.out, "{start_label}:")?;
        let cond_reg = self.gen_expr(cond)?;
        writeln!(self.out, "    beqz {cond_reg}, {end_label}")?;
        self.free(&cond_reg);

        self.gen_stmt(body)?;
        writeln!(self.out, "    j {start_label}")?;
        writeln!(self.out, "{end_label}:")?;

        self.ctx.pop_break_target();
        self.ctx.pop_continue_target();
        Ok(())
    }

    fn gen_do_while(&mut self, body: &Stmt, cond: &Expr) -> Result<(), CodegenError> {
        let start_label = self.label("do_start");
        let cond_label = self.label("do_cond");
        let end_label = self.label("do_end");
        self.ctx.push_break_target(end_label.clone());
        self.ctx.push_continue_target(cond_label.clone());

        writeln!(self.out, "{start_label}:")?;
        self.gen_stmt(body)?;

        writeln!(self.out, "{cond_label}:")?;
        let cond_reg = self.gen_expr(cond)?;
        writeln!(self.out, "    bnez {cond_reg}, {start_label}")?;
        self.free(&cond_reg);
        writeln!(self.out, "{end_label}:")?;

        self.ctx.pop_break_target();
        self.ctx.pop_continue_target();
        Ok(())
    }

    fn gen_for(
        &mut self,
        init: Option<&ForInit>,
        cond: Option<&Expr>,
        step: Option<&Expr>,
        body: &Stmt,
    ) -> Result<(), CodegenError> {
        let init_label = self.label("for_init");
        let cond_label = self.label("for_cond");
        let incr_label = self.label("for_incr");
        let body_label = self.label("for_body");
        let end_label = self.label("for_end");

        self.ctx.push_break_target(end_label.clone());
        self.ctx.push_continue_target(incr_label.clone());

        // a declaration in the initializer is scoped to the loop
        let own_scope = matches!(init, Some(ForInit::Decl(_)));
        if own_scope {
            self.ctx.enter_scope(false);
        }

        writeln!(self.out, "{init_label}:")?;
        match init {
            Some(ForInit::Decl(decl)) => self.gen_local_var(decl)?,
            Some(ForInit::Expr(expr)) => {
                let reg = self.gen_expr(expr)?;
                self.free(&reg);
            }
            None => {}
        }

        writeln!(self.out, "    j {cond_label}")?;
        writeln!(self.out, "{body_label}:")?;
        self.gen_stmt(body)?;

        writeln!(self.out, "{incr_label}:")?;
        if let Some(step) = step {
            let reg = self.gen_expr(step)?;
            self.free(&reg);
        }

        writeln!(self.out, "{cond_label}:")?;
        match cond {
            Some(cond) => {
                let cond_reg = self.gen_expr(cond)?;
                writeln!(self.out, "    bnez {cond_reg}, {body_label}")?;
                self.free(&cond_reg);
            }
            None => writeln!(self.out, "    j {body_label}")?,
        }
        writeln!(self.out, "{end_label}:")?;

        if own_scope {
            self.ctx.exit_scope()?;
        }
        self.ctx.pop_break_target();
        self.ctx.pop_continue_target();
        Ok(())
    }

    fn gen_switch(&mut self, scrutinee: &Expr, body: &Stmt) -> Result<(), CodegenError> {
        let switch_reg = self.gen_expr(scrutinee)?;
        self.ctx.push_switch_value(switch_reg.clone());
        let end_label = self.label("switch_end");
        self.ctx.push_break_target(end_label.clone());

        self.gen_stmt(body)?;

        if let Some(pending) = self.pending_next_case.take() {
            writeln!(self.out, "{pending}:")?;
        }
        writeln!(self.out, "{end_label}:")?;

        self.ctx.pop_break_target();
        self.ctx.pop_switch_value();
        self.free(&switch_reg);
        Ok(())
    }

    fn gen_case(&mut self, value: Option<&Expr>, stmt: &Stmt) -> Result<(), CodegenError> {
        if let Some(pending) = self.pending_next_case.take() {
            writeln!(self.out, "{pending}:")?;
        }
        let case_label = self.label("case");
        let next_case_label = self.label("next_case");
        let switch_reg = self
            .ctx
            .current_switch_value()
            .ok_or_else(|| {
                CodegenError::Unsupported("case outside of a switch".to_string())
            })?
            .to_string();

        match value {
            Some(value) => {
                let value_reg = self.gen_expr(value)?;
                writeln!(self.out, "    beq {switch_reg}, {value_reg}, {case_label}")?;
                writeln!(self.out, "    j {next_case_label}")?;
                writeln!(self.out, "{case_label}:")?;
                self.free(&value_reg);
            }
            // default takes its label unconditionally
            None => writeln!(self.out, "{case_label}:")?,
        }

        self.gen_stmt(stmt)?;
        self.pending_next_case = Some(next_case_label);
        Ok(())
    }

    fn gen_return(&mut self, expr: Option<&Expr>) -> Result<(), CodegenError> {
        if let Some(expr) = expr {
            let result = self.gen_expr(expr)?;
            let function = self.ctx.current_function()?;
            match self.ctx.function_return_type(function)? {
                Type::Float => {
                    writeln!(self.out, "    fmv.s fa0, {result}")?;
                    self.ctx.free_float_register(&result);
                }
                Type::Double => {
                    writeln!(self.out, "    fmv.d fa0, {result}")?;
                    self.ctx.free_float_register(&result);
                }
                _ => {
                    writeln!(self.out, "    mv a0, {result}")?;
                    self.ctx.free_register(&result);
                }
            }
        }
        let function = self.ctx.current_function()?;
        let end_label = self.ctx.function_end_label(function)?;
        writeln!(self.out, "    j {end_label}")?;
        Ok(())
    }

    // ----- expressions -----

    fn gen_expr(&mut self, expr: &Expr) -> Result<String, CodegenError> {
        match expr {
            Expr::IntLiteral(value) => {
                let reg = self.ctx.allocate_register(&[], None)?;
                writeln!(self.out, "    li {reg}, {value}")?;
                Ok(reg)
            }
            Expr::CharLiteral(value) => {
                let reg = self.ctx.allocate_register(&[], None)?;
                writeln!(self.out, "    li {reg}, {value}")?;
                Ok(reg)
            }
            Expr::FloatLiteral(value) => {
                let label = self.ctx.float_label(*value);
                let addr = self.ctx.allocate_register(&[], None)?;
                let reg = self.ctx.allocate_float_register(&[], None)?;
                writeln!(self.out, "    lui {addr},%hi({label})")?;
                writeln!(self.out, "    flw {reg},%lo({label})({addr})")?;
                self.ctx.free_register(&addr);
                Ok(reg)
            }
            Expr::DoubleLiteral(value) => {
                let label = self.ctx.double_label(*value);
                let addr = self.ctx.allocate_register(&[], None)?;
                let reg = self.ctx.allocate_float_register(&[], None)?;
                writeln!(self.out, "    lui {addr},%hi({label})")?;
                writeln!(self.out, "    fld {reg},%lo({label})({addr})")?;
                self.ctx.free_register(&addr);
                Ok(reg)
            }
            Expr::StringLiteral(value) => {
                let label = self.ctx.string_label(value);
                let reg = self.ctx.allocate_register(&[], None)?;
                writeln!(self.out, "    lui {reg},%hi({label})")?;
                writeln!(self.out, "    addi {reg}, {reg},%lo({label})")?;
                Ok(reg)
            }
            Expr::Identifier(name) => self.gen_identifier(*name),
            Expr::Binary { op, lhs, rhs } => self.gen_binary(*op, lhs, rhs),
            Expr::Unary { op, operand } => self.gen_unary(*op, operand),
            Expr::Assignment { op, lhs, rhs } => self.gen_assignment(*op, lhs, rhs),
            Expr::Call { callee, args } => self.gen_call(callee, args),
            Expr::Index { array, index } => self.gen_index(array, index),
            Expr::Member { .. } => Err(CodegenError::Unsupported(
                "member access".to_string(),
            )),
            Expr::PointerMember { .. } => Err(CodegenError::Unsupported(
                "pointer member access".to_string(),
            )),
            // a cast is a compile-time view change; no conversion is emitted
            Expr::Cast { expr, .. } => self.gen_expr(expr),
            Expr::Conditional {
                cond,
                then_expr,
                else_expr,
            } => self.gen_conditional(cond, then_expr, else_expr),
            Expr::Comma { lhs, rhs } => {
                let left = self.gen_expr(lhs)?;
                self.free(&left);
                self.gen_expr(rhs)
            }
            Expr::SizeofExpr(expr) => {
                let size = self.expr_type(expr).size();
                let multiplier = expr
                    .as_identifier()
                    .map(|name| self.ctx.array_size(name))
                    .unwrap_or(1);
                let reg = self.ctx.allocate_register(&[], None)?;
                writeln!(self.out, "    li {reg}, {}", size * multiplier)?;
                Ok(reg)
            }
            Expr::SizeofType(ty) => {
                let reg = self.ctx.allocate_register(&[], None)?;
                writeln!(self.out, "    li {reg}, {}", ty.size())?;
                Ok(reg)
            }
        }
    }

    fn gen_identifier(&mut self, name: Id) -> Result<String, CodegenError> {
        // enumerators are integer constants, not storage
        if self.ctx.is_enum_value(name) {
            let value = self.ctx.enum_value(name)?;
            let reg = self.ctx.allocate_register(&[], None)?;
            writeln!(self.out, "    li {reg}, {value}")?;
            return Ok(reg);
        }

        if self.ctx.is_global(name) {
            let var = self
                .ctx
                .find_variable(name)
                .ok_or(CodegenError::UndefinedVariable(name))?;
            let addr = self.ctx.allocate_register(&[], None)?;
            writeln!(self.out, "    lui {addr}, %hi({name})")?;
            let dest = match scalar_class(var.ty) {
                _ if var.is_pointer => {
                    let dest = self.ctx.allocate_register(&[addr.as_str()], None)?;
                    writeln!(self.out, "    lw {dest}, %lo({name})({addr})")?;
                    dest
                }
                Type::Float => {
                    let dest = self.ctx.allocate_float_register(&[], None)?;
                    writeln!(self.out, "    flw {dest}, %lo({name})({addr})")?;
                    dest
                }
                Type::Double => {
                    let dest = self.ctx.allocate_float_register(&[], None)?;
                    writeln!(self.out, "    fld {dest}, %lo({name})({addr})")?;
                    dest
                }
                Type::Char => {
                    let dest = self.ctx.allocate_register(&[addr.as_str()], None)?;
                    writeln!(self.out, "    lbu {dest}, %lo({name})({addr})")?;
                    dest
                }
                _ => {
                    let dest = self.ctx.allocate_register(&[addr.as_str()], None)?;
                    writeln!(self.out, "    lw {dest}, %lo({name})({addr})")?;
                    dest
                }
            };
            self.ctx.free_register(&addr);
            return Ok(dest);
        }

        let var = self
            .ctx
            .find_variable(name)
            .ok_or(CodegenError::UndefinedVariable(name))?;
        let reg = if var.ty.is_floating() && !var.is_pointer {
            self.ctx.allocate_float_register(&[], None)?
        } else {
            self.ctx.allocate_register(&[], None)?
        };
        self.ctx.load_variable(&mut self.out, &reg, name)?;
        Ok(reg)
    }

    fn gen_binary(
        &mut self,
        op: BinaryOp,
        lhs: &Expr,
        rhs: &Expr,
    ) -> Result<String, CodegenError> {
        // logical operators short-circuit, so the right operand is only
        // lowered behind the branch on the left one
        if matches!(op, BinaryOp::LogicalAnd | BinaryOp::LogicalOr) {
            return self.gen_logical(op, lhs, rhs);
        }

        let left = self.gen_expr(lhs)?;
        let right = self.gen_expr(rhs)?;

        let left_ptr = self.pointer_operand(lhs);
        let right_ptr = self.pointer_operand(rhs);
        if left_ptr.is_some() || right_ptr.is_some() {
            return self.gen_pointer_binary(op, &left, &right, left_ptr, right_ptr);
        }

        let l = scalar_class(self.expr_type(lhs));
        let r = scalar_class(self.expr_type(rhs));
        let result = if l == Type::Int && r == Type::Int {
            self.gen_int_binary(op, &left, &right, false)?
        } else if l == Type::Float || r == Type::Float {
            self.gen_float_binary(op, &left, &right, ".s")?
        } else if l == Type::Double || r == Type::Double {
            self.gen_float_binary(op, &left, &right, ".d")?
        } else {
            // char operands: unsigned comparisons, integer arithmetic
            self.gen_int_binary(op, &left, &right, true)?
        };

        self.free(&left);
        self.free(&right);
        Ok(result)
    }

    fn gen_int_binary(
        &mut self,
        op: BinaryOp,
        left: &str,
        right: &str,
        unsigned_cmp: bool,
    ) -> Result<String, CodegenError> {
        let result = self.ctx.allocate_register(&[left, right], None)?;
        let u = if unsigned_cmp { "u" } else { "" };
        match op {
            BinaryOp::Add => writeln!(self.out, "    add {result}, {left}, {right}")?,
            BinaryOp::Sub => writeln!(self.out, "    sub {result}, {left}, {right}")?,
            BinaryOp::Mul => writeln!(self.out, "    mul {result}, {left}, {right}")?,
            BinaryOp::Div => writeln!(self.out, "    div {result}, {left}, {right}")?,
            BinaryOp::Mod => writeln!(self.out, "    rem {result}, {left}, {right}")?,
            BinaryOp::Lt => writeln!(self.out, "    slt{u} {result}, {left}, {right}")?,
            BinaryOp::Gt => writeln!(self.out, "    sgt{u} {result}, {left}, {right}")?,
            BinaryOp::Le => {
                writeln!(self.out, "    sgt{u} {result}, {left}, {right}")?;
                writeln!(self.out, "    xori {result}, {result}, 1")?;
            }
            BinaryOp::Ge => {
                writeln!(self.out, "    slt{u} {result}, {left}, {right}")?;
                writeln!(self.out, "    xori {result}, {result}, 1")?;
            }
            BinaryOp::Eq => {
                writeln!(self.out, "    xor {result}, {left}, {right}")?;
                writeln!(self.out, "    seqz {result}, {result}")?;
            }
            BinaryOp::Ne => {
                writeln!(self.out, "    xor {result}, {left}, {right}")?;
                writeln!(self.out, "    snez {result}, {result}")?;
            }
            BinaryOp::BitAnd => writeln!(self.out, "    and {result}, {left}, {right}")?,
            BinaryOp::BitOr => writeln!(self.out, "    or {result}, {left}, {right}")?,
            BinaryOp::BitXor => writeln!(self.out, "    xor {result}, {left}, {right}")?,
            BinaryOp::LeftShift => writeln!(self.out, "    sll {result}, {left}, {right}")?,
            BinaryOp::RightShift => writeln!(self.out, "    sra {result}, {left}, {right}")?,
            BinaryOp::LogicalAnd | BinaryOp::LogicalOr => {
                unreachable!("logical operators are lowered separately")
            }
        }
        Ok(result)
    }

    /// Floating arithmetic lands in a floating register; comparisons write a
    /// fresh integer register (freed by whoever consumes the result).
    fn gen_float_binary(
        &mut self,
        op: BinaryOp,
        left: &str,
        right: &str,
        suffix: &str,
    ) -> Result<String, CodegenError> {
        match op {
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => {
                let result = self.ctx.allocate_float_register(&[left, right], None)?;
                let mnemonic = match op {
                    BinaryOp::Add => "fadd",
                    BinaryOp::Sub => "fsub",
                    BinaryOp::Mul => "fmul",
                    _ => "fdiv",
                };
                writeln!(self.out, "    {mnemonic}{suffix} {result}, {left}, {right}")?;
                Ok(result)
            }
            BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge => {
                let result = self.ctx.allocate_register(&[], None)?;
                let mnemonic = match op {
                    BinaryOp::Lt => "flt",
                    BinaryOp::Gt => "fgt",
                    BinaryOp::Le => "fle",
                    _ => "fge",
                };
                writeln!(self.out, "    {mnemonic}{suffix} {result}, {left}, {right}")?;
                Ok(result)
            }
            BinaryOp::Eq => {
                let result = self.ctx.allocate_register(&[], None)?;
                writeln!(self.out, "    feq{suffix} {result}, {left}, {right}")?;
                Ok(result)
            }
            BinaryOp::Ne => {
                let result = self.ctx.allocate_register(&[], None)?;
                writeln!(self.out, "    feq{suffix} {result}, {left}, {right}")?;
                writeln!(self.out, "    xori {result}, {result}, 1")?;
                Ok(result)
            }
            _ => Err(CodegenError::Unsupported(format!(
                "operator {op:?} on floating-point operands"
            ))),
        }
    }

    fn gen_pointer_binary(
        &mut self,
        op: BinaryOp,
        left: &str,
        right: &str,
        left_ptr: Option<Variable>,
        right_ptr: Option<Variable>,
    ) -> Result<String, CodegenError> {
        // the integer operand is scaled by the pointee's size
        let pointee_size = right_ptr
            .or(left_ptr)
            .map(|var| var.ty.size())
            .unwrap_or(4);
        let result = self.ctx.allocate_register(&[left, right], None)?;

        match op {
            BinaryOp::Add => match (left_ptr.is_some(), right_ptr.is_some()) {
                (true, false) => {
                    let scale = self.ctx.allocate_register(&[left, right, result.as_str()], None)?;
                    writeln!(self.out, "    li {scale}, {pointee_size}")?;
                    writeln!(self.out, "    mul {right}, {right}, {scale}")?;
                    writeln!(self.out, "    add {result}, {left}, {right}")?;
                    self.ctx.free_register(&scale);
                }
                (false, true) => {
                    let scale = self.ctx.allocate_register(&[left, right, result.as_str()], None)?;
                    writeln!(self.out, "    li {scale}, {pointee_size}")?;
                    writeln!(self.out, "    mul {left}, {left}, {scale}")?;
                    writeln!(self.out, "    add {result}, {left}, {right}")?;
                    self.ctx.free_register(&scale);
                }
                _ => {
                    return Err(CodegenError::Unsupported(
                        "addition of two pointers".to_string(),
                    ))
                }
            },
            BinaryOp::Sub => match (left_ptr.is_some(), right_ptr.is_some()) {
                (true, false) => {
                    let scale = self.ctx.allocate_register(&[left, right, result.as_str()], None)?;
                    writeln!(self.out, "    li {scale}, {pointee_size}")?;
                    writeln!(self.out, "    mul {right}, {right}, {scale}")?;
                    writeln!(self.out, "    sub {result}, {left}, {right}")?;
                    self.ctx.free_register(&scale);
                }
                // ptr - ptr yields an element count
                (true, true) => {
                    writeln!(self.out, "    sub {result}, {left}, {right}")?;
                    let divisor = self.ctx.allocate_register(&[result.as_str()], None)?;
                    writeln!(self.out, "    li {divisor}, {pointee_size}")?;
                    writeln!(self.out, "    div {result}, {result}, {divisor}")?;
                    self.ctx.free_register(&divisor);
                }
                _ => {
                    return Err(CodegenError::Unsupported(
                        "subtracting a pointer from an integer".to_string(),
                    ))
                }
            },
            // pointer comparisons are plain integer comparisons
            BinaryOp::Eq => {
                writeln!(self.out, "    xor {result}, {left}, {right}")?;
                writeln!(self.out, "    seqz {result}, {result}")?;
            }
            BinaryOp::Ne => {
                writeln!(self.out, "    xor {result}, {left}, {right}")?;
                writeln!(self.out, "    snez {result}, {result}")?;
            }
            BinaryOp::Lt => writeln!(self.out, "    slt {result}, {left}, {right}")?,
            BinaryOp::Gt => writeln!(self.out, "    sgt {result}, {left}, {right}")?,
            BinaryOp::Le => {
                writeln!(self.out, "    sgt {result}, {left}, {right}")?;
                writeln!(self.out, "    xori {result}, {result}, 1")?;
            }
            BinaryOp::Ge => {
                writeln!(self.out, "    slt {result}, {left}, {right}")?;
                writeln!(self.out, "    xori {result}, {result}, 1")?;
            }
            _ => {
                return Err(CodegenError::Unsupported(format!(
                    "operator {op:?} on pointer operands"
                )))
            }
        }

        self.ctx.free_register(left);
        self.ctx.free_register(right);
        Ok(result)
    }

    fn gen_logical(
        &mut self,
        op: BinaryOp,
        lhs: &Expr,
        rhs: &Expr,
    ) -> Result<String, CodegenError> {
        let result = self.ctx.allocate_register(&[], None)?;
        match op {
            BinaryOp::LogicalAnd => {
                let false_label = self.label("logical_and");
                let end_label = self.label("logical_and");

                let left = self.gen_expr(lhs)?;
                writeln!(self.out, "    beqz {left}, {false_label}")?;
                self.free(&left);

                let right = self.gen_expr(rhs)?;
                writeln!(self.out, "    beqz {right}, {false_label}")?;
                self.free(&right);

                writeln!(self.out, "    li {result}, 1")?;
                writeln!(self.out, "    j {end_label}")?;
                writeln!(self.out, "{false_label}:")?;
                writeln!(self.out, "    li {result}, 0")?;
                writeln!(self.out, "{end_label}:")?;
            }
            BinaryOp::LogicalOr => {
                let true_label = self.label("logical_or");
                let false_label = self.label("logical_or");
                let end_label = self.label("logical_or");

                let left = self.gen_expr(lhs)?;
                writeln!(self.out, "    bnez {left}, {true_label}")?;
                self.free(&left);

                let right = self.gen_expr(rhs)?;
                writeln!(self.out, "    beqz {right}, {false_label}")?;
                self.free(&right);

                writeln!(self.out, "{true_label}:")?;
                writeln!(self.out, "    li {result}, 1")?;
                writeln!(self.out, "    j {end_label}")?;
                writeln!(self.out, "{false_label}:")?;
                writeln!(self.out, "    li {result}, 0")?;
                writeln!(self.out, "{end_label}:")?;
            }
            _ => unreachable!("only logical operators reach here"),
        }
        Ok(result)
    }

    fn gen_unary(&mut self, op: UnaryOp, operand: &Expr) -> Result<String, CodegenError> {
        match op {
            UnaryOp::PreIncrement
            | UnaryOp::PreDecrement
            | UnaryOp::PostIncrement
            | UnaryOp::PostDecrement => self.gen_increment(op, operand),
            UnaryOp::Plus => self.gen_expr(operand),
            UnaryOp::Minus => {
                let reg = self.gen_expr(operand)?;
                match scalar_class(self.expr_type(operand)) {
                    Type::Float => writeln!(self.out, "    fneg.s {reg}, {reg}")?,
                    Type::Double => writeln!(self.out, "    fneg.d {reg}, {reg}")?,
                    _ => writeln!(self.out, "    neg {reg}, {reg}")?,
                }
                Ok(reg)
            }
            UnaryOp::LogicalNot => {
                let reg = self.gen_expr(operand)?;
                writeln!(self.out, "    seqz {reg}, {reg}")?;
                Ok(reg)
            }
            UnaryOp::BitNot => {
                let reg = self.gen_expr(operand)?;
                writeln!(self.out, "    not {reg}, {reg}")?;
                Ok(reg)
            }
            UnaryOp::AddressOf => {
                let name = operand.as_identifier().ok_or_else(|| {
                    CodegenError::Unsupported("address of a non-identifier".to_string())
                })?;
                let var = self
                    .ctx
                    .find_variable(name)
                    .ok_or(CodegenError::UndefinedVariable(name))?;
                let reg = self.ctx.allocate_register(&[], None)?;
                writeln!(self.out, "    addi {reg}, s0, {}", var.stack_offset)?;
                Ok(reg)
            }
            UnaryOp::Dereference => {
                let addr = self.gen_expr(operand)?;
                match self.pointee_type(operand) {
                    Type::Char => {
                        writeln!(self.out, "    lb {addr}, 0({addr})")?;
                        Ok(addr)
                    }
                    Type::Float => {
                        let reg = self.ctx.allocate_float_register(&[], None)?;
                        writeln!(self.out, "    flw {reg}, 0({addr})")?;
                        self.ctx.free_register(&addr);
                        Ok(reg)
                    }
                    Type::Double => {
                        let reg = self.ctx.allocate_float_register(&[], None)?;
                        writeln!(self.out, "    fld {reg}, 0({addr})")?;
                        self.ctx.free_register(&addr);
                        Ok(reg)
                    }
                    _ => {
                        writeln!(self.out, "    lw {addr}, 0({addr})")?;
                        Ok(addr)
                    }
                }
            }
        }
    }

    /// Only identifier operands can be incremented or decremented.
    fn gen_increment(&mut self, op: UnaryOp, operand: &Expr) -> Result<String, CodegenError> {
        let name = operand.as_identifier().ok_or_else(|| {
            CodegenError::Unsupported(
                "increment/decrement of a non-identifier".to_string(),
            )
        })?;
        let result = self.ctx.allocate_register(&[], None)?;
        let delta = match op {
            UnaryOp::PreIncrement | UnaryOp::PostIncrement => 1,
            _ => -1,
        };
        match op {
            UnaryOp::PreIncrement | UnaryOp::PreDecrement => {
                self.ctx.load_variable(&mut self.out, &result, name)?;
                writeln!(self.out, "    addi {result}, {result}, {delta}")?;
                self.ctx.store_variable(&mut self.out, &result, name)?;
            }
            _ => {
                // x++ publishes the old value and stores the new one
                let temp = self.ctx.allocate_register(&[result.as_str()], None)?;
                self.ctx.load_variable(&mut self.out, &temp, name)?;
                writeln!(self.out, "    mv {result}, {temp}")?;
                writeln!(self.out, "    addi {temp}, {temp}, {delta}")?;
                self.ctx.store_variable(&mut self.out, &temp, name)?;
                self.ctx.free_register(&temp);
            }
        }
        Ok(result)
    }

    fn gen_assignment(
        &mut self,
        op: AssignOp,
        lhs: &Expr,
        rhs: &Expr,
    ) -> Result<String, CodegenError> {
        if op == AssignOp::Assign {
            let value = self.gen_expr(rhs)?;
            match lhs {
                Expr::Unary {
                    op: UnaryOp::Dereference,
                    operand,
                } => {
                    let addr = self.gen_expr(operand)?;
                    writeln!(self.out, "    sw {value}, 0({addr})")?;
                    self.ctx.free_register(&addr);
                    Ok(value)
                }
                Expr::Index { array, index } => {
                    self.gen_index_store(array, index, &value)?;
                    Ok(value)
                }
                Expr::Identifier(name) => {
                    if self.ctx.is_global(*name) {
                        let addr = self.ctx.allocate_register(&[value.as_str()], None)?;
                        writeln!(self.out, "    lui {addr}, %hi({name})")?;
                        writeln!(self.out, "    addi {addr}, {addr}, %lo({name})")?;
                        let store = match scalar_class(self.ctx.variable_type(*name)?) {
                            Type::Float => "fsw",
                            Type::Double => "fsd",
                            Type::Char => "sb",
                            _ => "sw",
                        };
                        writeln!(self.out, "    {store} {value}, 0({addr})")?;
                        self.ctx.free_register(&addr);
                    } else {
                        self.ctx.store_variable(&mut self.out, &value, *name)?;
                    }
                    Ok(value)
                }
                _ => Err(CodegenError::Unsupported(
                    "assignment target".to_string(),
                )),
            }
        } else {
            // compound assignment works on integers through an identifier
            let name = lhs.as_identifier().ok_or_else(|| {
                CodegenError::Unsupported(
                    "compound assignment to a non-identifier".to_string(),
                )
            })?;
            let left = self.ctx.allocate_register(&[], None)?;
            self.ctx.load_variable(&mut self.out, &left, name)?;
            let right = self.gen_expr(rhs)?;
            let result = self.ctx.allocate_register(&[left.as_str(), right.as_str()], None)?;

            let mnemonic = match op {
                AssignOp::AddAssign => "add",
                AssignOp::SubAssign => "sub",
                AssignOp::MulAssign => "mul",
                AssignOp::DivAssign => "div",
                AssignOp::ModAssign => "rem",
                AssignOp::AndAssign => "and",
                AssignOp::OrAssign => "or",
                AssignOp::XorAssign => "xor",
                AssignOp::LeftAssign => "sll",
                AssignOp::RightAssign => "sra",
                AssignOp::Assign => unreachable!("plain assignment handled above"),
            };
            writeln!(self.out, "    {mnemonic} {result}, {left}, {right}")?;
            self.ctx.store_variable(&mut self.out, &result, name)?;
            self.ctx.free_register(&left);
            self.ctx.free_register(&right);
            Ok(result)
        }
    }

    /// Element store for `a[i] = v`, global or frame-resident.
    fn gen_index_store(
        &mut self,
        array: &Expr,
        index: &Expr,
        value: &str,
    ) -> Result<(), CodegenError> {
        let name = array.as_identifier().ok_or_else(|| {
            CodegenError::Unsupported("assignment into a computed array".to_string())
        })?;
        let var = self
            .ctx
            .find_variable(name)
            .ok_or(CodegenError::UndefinedVariable(name))?;
        let index_reg = self.gen_expr(index)?;
        let elem_size = var.ty.size();

        let offset = self.ctx.allocate_register(&[value, index_reg.as_str()], None)?;
        writeln!(self.out, "    li {offset}, {elem_size}")?;
        writeln!(self.out, "    mul {offset}, {index_reg}, {offset}")?;

        let addr = self
            .ctx
            .allocate_register(&[value, index_reg.as_str(), offset.as_str()], None)?;
        if self.ctx.is_global(name) {
            writeln!(self.out, "    lui {addr}, %hi({name})")?;
            writeln!(self.out, "    addi {addr}, {addr}, %lo({name})")?;
            writeln!(self.out, "    add {addr}, {addr}, {offset}")?;
        } else if var.is_pointer {
            writeln!(self.out, "    lw {addr}, {}(s0)", var.stack_offset)?;
            writeln!(self.out, "    add {addr}, {addr}, {offset}")?;
        } else {
            writeln!(self.out, "    add {addr}, s0, {offset}")?;
            writeln!(self.out, "    addi {addr}, {addr}, {}", var.stack_offset)?;
        }

        let op = match scalar_class(var.ty) {
            Type::Float => "fsw",
            Type::Double => "fsd",
            Type::Char => "sb",
            _ => "sw",
        };
        writeln!(self.out, "    {op} {value}, 0({addr})")?;

        self.ctx.free_register(&index_reg);
        self.ctx.free_register(&offset);
        self.ctx.free_register(&addr);
        Ok(())
    }

    fn gen_index(&mut self, array: &Expr, index: &Expr) -> Result<String, CodegenError> {
        let name = array.as_identifier().ok_or_else(|| {
            CodegenError::Unsupported("indexing a computed expression".to_string())
        })?;
        let var = self
            .ctx
            .find_variable(name)
            .ok_or(CodegenError::UndefinedVariable(name))?;

        let index_reg = self.gen_expr(index)?;
        let elem_size = var.ty.size();
        let offset = self.ctx.allocate_register(&[index_reg.as_str()], None)?;
        writeln!(self.out, "    li {offset}, {elem_size}")?;
        writeln!(self.out, "    mul {offset}, {index_reg}, {offset}")?;

        let elem_class = scalar_class(var.ty);
        let result = if elem_class.is_floating() {
            self.ctx.allocate_float_register(&[], None)?
        } else {
            self.ctx.allocate_register(&[index_reg.as_str(), offset.as_str()], None)?
        };
        let load = match elem_class {
            Type::Char => "lbu",
            Type::Float => "flw",
            Type::Double => "fld",
            _ => "lw",
        };

        if self.ctx.is_global(name) {
            let addr = self
                .ctx
                .allocate_register(&[index_reg.as_str(), offset.as_str(), result.as_str()], None)?;
            writeln!(self.out, "    lui {addr}, %hi({name})")?;
            writeln!(self.out, "    addi {addr}, {addr}, %lo({name})")?;
            writeln!(self.out, "    add {addr}, {addr}, {offset}")?;
            writeln!(self.out, "    {load} {result}, 0({addr})")?;
            self.ctx.free_register(&addr);
        } else {
            if var.is_array {
                writeln!(self.out, "    add {offset}, s0, {offset}")?;
                writeln!(self.out, "    addi {offset}, {offset}, {}", var.stack_offset)?;
            } else if var.is_pointer {
                // indexing through a pointer loads the pointer first
                let ptr = self
                    .ctx
                    .allocate_register(&[index_reg.as_str(), offset.as_str(), result.as_str()], None)?;
                writeln!(self.out, "    lw {ptr}, {}(s0)", var.stack_offset)?;
                writeln!(self.out, "    add {offset}, {ptr}, {offset}")?;
                self.ctx.free_register(&ptr);
            }
            writeln!(self.out, "    {load} {result}, 0({offset})")?;
        }

        self.ctx.free_register(&index_reg);
        self.ctx.free_register(&offset);
        Ok(result)
    }

    fn gen_call(&mut self, callee: &Expr, args: &[Expr]) -> Result<String, CodegenError> {
        // arguments past the eighth travel on the caller's stack
        let mut stack_args_size = 0;
        if args.len() > 8 {
            stack_args_size = (args.len() as i32 - 8) * 4;
            if stack_args_size % 16 != 0 {
                stack_args_size = (stack_args_size + 15) / 16 * 16;
            }
            writeln!(self.out, "    addi sp, sp, -{stack_args_size}")?;
        }

        // ABI registers are assigned by class, in original argument order
        let mut class_index = vec![0usize; args.len()];
        let mut ints = 0;
        let mut floats = 0;
        for (i, arg) in args.iter().enumerate() {
            if self.expr_type(arg).is_floating() {
                class_index[i] = floats;
                floats += 1;
            } else {
                class_index[i] = ints;
                ints += 1;
            }
        }

        // evaluate in reverse so stack arguments settle first
        for i in (0..args.len()).rev() {
            let arg = &args[i];
            let ty = self.expr_type(arg);
            let reg = self.gen_expr(arg)?;
            if i < 8 {
                if ty.is_floating() {
                    let dest = format!("fa{}", class_index[i]);
                    if reg != dest {
                        let mv = if ty == Type::Float { "fmv.s" } else { "fmv.d" };
                        writeln!(self.out, "    {mv} {dest}, {reg}")?;
                        self.ctx.free_float_register(&reg);
                    }
                } else {
                    let dest = format!("a{}", class_index[i]);
                    if reg != dest {
                        writeln!(self.out, "    mv {dest}, {reg}")?;
                        self.ctx.free_register(&reg);
                    }
                }
            } else {
                let offset = (i as i32 - 8) * 4;
                match ty {
                    Type::Float => {
                        writeln!(self.out, "    fsw {reg}, {offset}(sp)")?;
                        self.ctx.free_float_register(&reg);
                    }
                    Type::Double => {
                        writeln!(self.out, "    fsd {reg}, {offset}(sp)")?;
                        self.ctx.free_float_register(&reg);
                    }
                    _ => {
                        writeln!(self.out, "    sw {reg}, {offset}(sp)")?;
                        self.ctx.free_register(&reg);
                    }
                }
            }
        }

        self.ctx.save_registers(&mut self.out)?;

        let ret = callee
            .as_identifier()
            .and_then(|name| self.ctx.function_return_type(name).ok())
            .unwrap_or(Type::Int);

        match callee.as_identifier() {
            Some(name) => writeln!(self.out, "    call {name}")?,
            None => {
                let target = self.gen_expr(callee)?;
                writeln!(self.out, "    jalr {target}")?;
                self.ctx.free_register(&target);
            }
        }

        // restore reads the offsets save wrote, so it runs before the
        // argument area is popped
        self.ctx.restore_registers(&mut self.out)?;
        if stack_args_size > 0 {
            writeln!(self.out, "    addi sp, sp, {stack_args_size}")?;
        }

        let result = if ret.is_floating() {
            let result = self.ctx.allocate_float_register(&[], None)?;
            if result != "fa0" {
                let mv = if ret == Type::Float { "fmv.s" } else { "fmv.d" };
                writeln!(self.out, "    {mv} {result}, fa0")?;
            }
            result
        } else {
            let result = self.ctx.allocate_register(&[], None)?;
            if result != "a0" {
                writeln!(self.out, "    mv {result}, a0")?;
            }
            result
        };
        Ok(result)
    }

    fn gen_conditional(
        &mut self,
        cond: &Expr,
        then_expr: &Expr,
        else_expr: &Expr,
    ) -> Result<String, CodegenError> {
        let false_label = self.label("cond_false");
        let end_label = self.label("cond_end");

        // the then-branch type picks the result register's class
        let (result, mv) = match scalar_class(self.expr_type(then_expr)) {
            Type::Float => (self.ctx.allocate_float_register(&[], None)?, "fmv.s"),
            Type::Double => (self.ctx.allocate_float_register(&[], None)?, "fmv.d"),
            _ => (self.ctx.allocate_register(&[], None)?, "mv"),
        };

        let cond_reg = self.gen_expr(cond)?;
        writeln!(self.out, "    beqz {cond_reg}, {false_label}")?;
        self.free(&cond_reg);

        let then_reg = self.gen_expr(then_expr)?;
        writeln!(self.out, "    {mv} {result}, {then_reg}")?;
        self.free(&then_reg);
        writeln!(self.out, "    j {end_label}")?;

        writeln!(self.out, "{false_label}:")?;
        let else_reg = self.gen_expr(else_expr)?;
        writeln!(self.out, "    {mv} {result}, {else_reg}")?;
        self.free(&else_reg);
        writeln!(self.out, "{end_label}:")?;

        Ok(result)
    }
}

/// Constant literal values, with unary minus folded in.
enum Literal {
    Int(i32),
    Float(f32),
    Double(f64),
    Char(u8),
}

fn folded_literal(expr: &Expr) -> Option<Literal> {
    match expr {
        Expr::IntLiteral(v) => Some(Literal::Int(*v)),
        Expr::FloatLiteral(v) => Some(Literal::Float(*v)),
        Expr::DoubleLiteral(v) => Some(Literal::Double(*v)),
        Expr::CharLiteral(v) => Some(Literal::Char(*v)),
        Expr::Unary {
            op: UnaryOp::Minus,
            operand,
        } => match folded_literal(operand)? {
            Literal::Int(v) => Some(Literal::Int(-v)),
            Literal::Float(v) => Some(Literal::Float(-v)),
            Literal::Double(v) => Some(Literal::Double(-v)),
            Literal::Char(_) => None,
        },
        _ => None,
    }
}
