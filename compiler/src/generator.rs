//! Generator — lowered program to target source text.
//!
//! Output is one statement per line, wrapped in a leading and trailing
//! newline:
//!
//! ```text
//! const curried_add = runtime.curry(add);
//! const double = runtime.pipe(...);
//! runtime.pipe(state, curried_add(1), double)();
//! ```
//!
//! Every step renders as a single-argument function expression; lambdas
//! always name their parameter `x`.

use crate::ast::*;
use crate::runtime::{Runtime, RuntimeNames};

/// Generate code against the default runtime names.
pub fn generate(program: &TransformedProgram) -> String {
    generate_with(program, &RuntimeNames::default())
}

pub fn generate_with(program: &TransformedProgram, runtime: &dyn Runtime) -> String {
    Generator { runtime }.program(program)
}

struct Generator<'a> {
    runtime: &'a dyn Runtime,
}

impl Generator<'_> {
    fn program(&self, program: &TransformedProgram) -> String {
        let mut lines = Vec::new();

        for name in &program.curried {
            lines.push(format!(
                "const {} = {}({});",
                self.runtime.curried_name(name),
                self.runtime.curry(),
                name
            ));
        }

        for pipe in &program.pipes {
            lines.push(format!(
                "const {} = {}({});",
                pipe.name,
                self.runtime.pipe(),
                self.steps(&pipe.steps)
            ));
        }

        for invocation in &program.invocations {
            let argument = invocation.argument.as_ref().map(literal).unwrap_or_default();
            lines.push(format!(
                "{}({})({});",
                self.runtime.pipe(),
                self.steps(&invocation.steps),
                argument
            ));
        }

        format!("\n{}\n", lines.join("\n"))
    }

    fn steps(&self, steps: &[Step]) -> String {
        steps
            .iter()
            .map(|step| self.step(step))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn step(&self, step: &Step) -> String {
        match step {
            Step::Function(function) => self.function(function),
            Step::Method(method) => format!("x => x.{}({})", method.name, arguments(&method.args)),
            Step::SideEffect(name) => format!("{}({})", self.runtime.side_effect(), name),
            Step::Union(union) => {
                let members = union
                    .members
                    .iter()
                    .map(|member| self.function(member))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{}({})", self.runtime.union(), members)
            }
            Step::Switch(switch) => switch_lambda(switch),
        }
    }

    fn function(&self, function: &Function) -> String {
        let mut rendered = self.call(function);
        let mut is_lambda = flips(function);

        if function.negated {
            rendered = format!("{}({})", self.runtime.negate(), rendered);
            is_lambda = false;
        }

        match function.modifier {
            Some(Modifier::Defer) => {
                rendered = format!("() => {}", rendered);
                is_lambda = true;
            }
            Some(Modifier::Wrap) => {
                rendered = format!("x => {}(x)", rendered);
                is_lambda = true;
            }
            _ => {}
        }

        if function.if_branch.is_none() && function.else_branch.is_none() {
            return rendered;
        }

        let guard = if is_lambda {
            format!("({})", rendered)
        } else {
            rendered
        };
        let then = function
            .if_branch
            .as_deref()
            .map_or_else(|| "x".to_string(), |branch| format!("({})(x)", self.function(branch)));
        let otherwise = function
            .else_branch
            .as_deref()
            .map_or_else(|| "x".to_string(), |branch| format!("({})(x)", self.function(branch)));

        format!("x => {}(x) ? {} : {}", guard, then, otherwise)
    }

    /// The call itself, before negation, modifiers and branches.
    fn call(&self, function: &Function) -> String {
        if function.initial || function.args.is_empty() {
            return function.name.clone();
        }

        let callee = if function.disable_auto_currying {
            function.name.clone()
        } else {
            self.runtime.curried_name(&function.name)
        };

        if flips(function) {
            format!("x => {}(x)({})", callee, arguments(&function.args))
        } else {
            format!("{}({})", callee, arguments(&function.args))
        }
    }
}

fn flips(function: &Function) -> bool {
    function.modifier == Some(Modifier::Flip) && !function.initial && !function.args.is_empty()
}

/// `x => p1(x) ? v1(x) : p2(x) ? v2(x) : fallback`
fn switch_lambda(switch: &SwitchStatement) -> String {
    let fallback = switch
        .default
        .as_ref()
        .map_or_else(|| "x".to_string(), |default| format!("{}(x)", default.value));

    if switch.cases.is_empty() {
        return format!("x => {}", fallback);
    }

    let cases = switch
        .cases
        .iter()
        .map(|case| format!("{}(x) ? {}(x)", case.predicate, case.value))
        .collect::<Vec<_>>()
        .join(" : ");
    format!("x => {} : {}", cases, fallback)
}

fn arguments(args: &[Literal]) -> String {
    args.iter().map(literal).collect::<Vec<_>>().join(", ")
}

fn literal(literal: &Literal) -> String {
    match literal {
        Literal::Str(value) => format!("'{}'", value),
        Literal::Number(value) | Literal::Variable(value) => value.clone(),
    }
}
