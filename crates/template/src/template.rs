//! Compiled templates and their render context.

use crate::error::TemplateError;
use crate::functions::FunctionMap;
use crate::parser::{self, Command, Node, Operand, Pipeline};
use crate::value::Value;
use datagen_random::RandomSource;
use datagen_state::{GenerationState, RecordState};
use std::collections::HashMap;

/// Everything a template can see while one record renders.
///
/// `shared` outlives the record; `record` is created fresh for it; `data`
/// holds the fields reachable as `.K`, `.V`, `.H` or any other key.
pub struct RenderContext<'a> {
    pub shared: &'a GenerationState,
    pub record: &'a mut RecordState,
    pub data: &'a HashMap<String, String>,
}

impl<'a> RenderContext<'a> {
    pub fn new(
        shared: &'a GenerationState,
        record: &'a mut RecordState,
        data: &'a HashMap<String, String>,
    ) -> Self {
        Self {
            shared,
            record,
            data,
        }
    }

    pub fn random(&self) -> &'a RandomSource {
        self.shared.random()
    }
}

/// A template compiled once and rendered many times.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    nodes: Vec<Node>,
}

impl Template {
    /// Compile against the built-in functions.
    pub fn compile(name: &str, text: &str) -> Result<Self, TemplateError> {
        Self::compile_with(name, text, FunctionMap::builtin())
    }

    pub fn compile_with(
        name: &str,
        text: &str,
        functions: &FunctionMap,
    ) -> Result<Self, TemplateError> {
        let nodes = parser::parse(name, text, functions)?;
        Ok(Self {
            name: name.to_string(),
            nodes,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// True when the template renders nothing at all.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn render(&self, ctx: &mut RenderContext<'_>) -> Result<String, TemplateError> {
        let mut out = String::new();
        for node in &self.nodes {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Action(pipeline) => {
                    let value = self.eval_pipeline(pipeline, ctx)?;
                    out.push_str(&value.to_string());
                }
            }
        }
        Ok(out)
    }

    fn eval_pipeline(
        &self,
        pipeline: &Pipeline,
        ctx: &mut RenderContext<'_>,
    ) -> Result<Value, TemplateError> {
        let mut previous: Option<Value> = None;
        for command in &pipeline.stages {
            let value = match command {
                Command::Operand(operand) => self.eval_operand(operand, ctx)?,
                Command::Call { name, func, args } => {
                    let mut values = Vec::with_capacity(args.len() + 1);
                    for arg in args {
                        values.push(self.eval_operand(arg, ctx)?);
                    }
                    if let Some(piped) = previous.take() {
                        values.push(piped);
                    }
                    func(ctx, &values).map_err(|source| TemplateError::Function {
                        template: self.name.clone(),
                        function: name.clone(),
                        source,
                    })?
                }
            };
            previous = Some(value);
        }
        Ok(previous.unwrap_or_default())
    }

    fn eval_operand(
        &self,
        operand: &Operand,
        ctx: &mut RenderContext<'_>,
    ) -> Result<Value, TemplateError> {
        match operand {
            Operand::Literal(value) => Ok(value.clone()),
            Operand::Field(field) => Ok(ctx
                .data
                .get(field)
                .cloned()
                .unwrap_or_default()
                .into()),
            Operand::Nested(pipeline) => self.eval_pipeline(pipeline, ctx),
        }
    }
}
