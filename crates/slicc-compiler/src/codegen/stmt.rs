use std::rc::Rc;

use slicc_ast::ast::{BinaryExpr, BinaryOp, CallExpr, Expr, IfStmt, Literal, LocalStmt, ReturnStmt, Stmt};
use slicc_ast::Location;

use crate::codegen::CodeFormatter;
use crate::error::CompileError;
use crate::machine::StateMachine;
use crate::resolver::TypeResolver;
use crate::scope::SymbolTable;
use crate::symbols::{Symbol, Var};
use crate::types::{same_type, TypeHandle};

const INT: &str = "int";
const BOOL: &str = "bool";
const STRING: &str = "string";

/// Generates code for the statements of one function body.
///
/// Runs inside the function's frame: parameters are already registered,
/// locals are added to the innermost frame, and each nested block gets a
/// frame of its own.
pub struct BodyGenerator<'a> {
    symtab: &'a mut SymbolTable,
    machine: Option<&'a StateMachine>,
    return_type: &'a TypeHandle,
}

impl<'a> BodyGenerator<'a> {
    pub fn new(
        symtab: &'a mut SymbolTable,
        machine: Option<&'a StateMachine>,
        return_type: &'a TypeHandle,
    ) -> Self {
        Self {
            symtab,
            machine,
            return_type,
        }
    }

    pub fn generate(&mut self, out: &mut CodeFormatter, stmts: &[Stmt]) -> Result<(), CompileError> {
        for stmt in stmts {
            self.stmt(out, stmt)?;
        }
        Ok(())
    }

    fn stmt(&mut self, out: &mut CodeFormatter, stmt: &Stmt) -> Result<(), CompileError> {
        match stmt {
            Stmt::Expr(s) => {
                let (code, _) = self.expr(&s.expr)?;
                out.line(format!("{code};"));
            }
            Stmt::Return(s) => self.return_stmt(out, s)?,
            Stmt::Assign(s) => {
                if !matches!(s.lhs, Expr::Var(_)) {
                    return Err(CompileError::InvalidAssignment {
                        location: s.location.clone(),
                    });
                }
                let (lhs, lhs_type) = self.expr(&s.lhs)?;
                let (rhs, rhs_type) = self.expr(&s.rhs)?;
                expect_type(&lhs_type, &rhs_type, &s.location)?;
                out.line(format!("{lhs} = {rhs};"));
            }
            Stmt::Local(s) => self.local(out, s)?,
            Stmt::If(s) => self.if_stmt(out, s)?,
        }
        Ok(())
    }

    fn return_stmt(&mut self, out: &mut CodeFormatter, s: &ReturnStmt) -> Result<(), CompileError> {
        match &s.value {
            None => {
                if !self.return_type.is_void() {
                    return Err(CompileError::TypeMismatch {
                        expected: self.return_type.ident.clone(),
                        found: crate::types::VOID.to_string(),
                        location: s.location.clone(),
                    });
                }
                out.line("return;");
            }
            Some(value) => {
                let (code, ty) = self.expr(value)?;
                if self.return_type.is_void() {
                    return Err(CompileError::TypeMismatch {
                        expected: crate::types::VOID.to_string(),
                        found: ty.ident.clone(),
                        location: s.location.clone(),
                    });
                }
                expect_type(self.return_type, &ty, &s.location)?;
                out.line(format!("return {code};"));
            }
        }
        Ok(())
    }

    fn local(&mut self, out: &mut CodeFormatter, s: &LocalStmt) -> Result<(), CompileError> {
        let ty = self.symtab.resolve_type(&s.ty.ident, &s.ty.location)?;

        // The initializer cannot see the variable it initializes.
        let init = match &s.init {
            Some(init) => {
                let (code, init_type) = self.expr(init)?;
                expect_type(&ty, &init_type, init.location())?;
                Some(code)
            }
            None => None,
        };

        let var = Var::new(&s.ident, s.location.clone(), Rc::clone(&ty));
        let line = match init {
            Some(code) => format!("{} {} = {};", ty.c_ident(), var.code, code),
            None => format!("{} {};", ty.c_ident(), var.code),
        };
        self.symtab.new_symbol(Symbol::Var(Rc::new(var)))?;
        out.line(line);
        Ok(())
    }

    fn if_stmt(&mut self, out: &mut CodeFormatter, s: &IfStmt) -> Result<(), CompileError> {
        let (cond, cond_type) = self.expr(&s.cond)?;
        let bool_type = self.symtab.resolve_type(BOOL, s.cond.location())?;
        expect_type(&bool_type, &cond_type, s.cond.location())?;

        out.line(format!("if ({cond}) {{"));
        out.indent();
        self.block(out, &s.then_block)?;
        out.dedent();

        if let Some(else_block) = &s.else_block {
            out.line("} else {");
            out.indent();
            self.block(out, else_block)?;
            out.dedent();
        }
        out.line("}");
        Ok(())
    }

    fn block(&mut self, out: &mut CodeFormatter, stmts: &[Stmt]) -> Result<(), CompileError> {
        let mut frame = self.symtab.frame();
        let mut inner = BodyGenerator::new(&mut frame, self.machine, self.return_type);
        inner.generate(out, stmts)
    }

    fn expr(&mut self, expr: &Expr) -> Result<(String, TypeHandle), CompileError> {
        match expr {
            Expr::Var(e) => {
                let var = self.symtab.find_var(&e.ident, &e.location)?;
                Ok((var.code.clone(), Rc::clone(&var.ty)))
            }
            Expr::Literal(e) => {
                let (code, type_name) = match &e.value {
                    Literal::Int(value) => (value.to_string(), INT),
                    Literal::Bool(value) => (value.to_string(), BOOL),
                    Literal::String(value) => (format!("\"{}\"", value.escape_default()), STRING),
                };
                let ty = self.symtab.resolve_type(type_name, &e.location)?;
                Ok((code, ty))
            }
            Expr::Call(e) => self.call(e),
            Expr::Binary(e) => self.binary(e),
        }
    }

    fn call(&mut self, e: &CallExpr) -> Result<(String, TypeHandle), CompileError> {
        // Functions of the enclosing machine take precedence over globals
        let func = match self.machine.and_then(|m| m.find_func(&e.ident)) {
            Some(func) => Rc::clone(func),
            None => self.symtab.find_func(&e.ident, &e.location)?,
        };

        if func.param_types.len() != e.args.len() {
            return Err(CompileError::ArgumentCount {
                func: func.ident.clone(),
                expected: func.param_types.len(),
                found: e.args.len(),
                location: e.location.clone(),
            });
        }

        let mut args = Vec::with_capacity(e.args.len());
        for (arg, param_type) in e.args.iter().zip(&func.param_types) {
            let (code, arg_type) = self.expr(arg)?;
            expect_type(param_type, &arg_type, arg.location())?;
            args.push(code);
        }

        Ok((
            format!("{}({})", func.ident, args.join(", ")),
            Rc::clone(&func.return_type),
        ))
    }

    fn binary(&mut self, e: &BinaryExpr) -> Result<(String, TypeHandle), CompileError> {
        let (lhs, lhs_type) = self.expr(&e.lhs)?;
        let (rhs, rhs_type) = self.expr(&e.rhs)?;
        expect_type(&lhs_type, &rhs_type, &e.location)?;

        let ty = match e.op {
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul => {
                let int_type = self.symtab.resolve_type(INT, &e.location)?;
                expect_type(&int_type, &lhs_type, &e.location)?;
                int_type
            }
            BinaryOp::And | BinaryOp::Or => {
                let bool_type = self.symtab.resolve_type(BOOL, &e.location)?;
                expect_type(&bool_type, &lhs_type, &e.location)?;
                bool_type
            }
            _ => self.symtab.resolve_type(BOOL, &e.location)?,
        };

        Ok((format!("({} {} {})", lhs, e.op.as_str(), rhs), ty))
    }
}

fn expect_type(
    expected: &TypeHandle,
    found: &TypeHandle,
    location: &Location,
) -> Result<(), CompileError> {
    if same_type(expected, found) {
        Ok(())
    } else {
        Err(CompileError::TypeMismatch {
            expected: expected.ident.clone(),
            found: found.ident.clone(),
            location: location.clone(),
        })
    }
}
