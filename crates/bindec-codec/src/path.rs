//! # Path Translation
//!
//! Typed paths name one generated type per step, with an optional key and
//! the case the step sits in. Normalized paths name one schema node per
//! step. The two differ in three places:
//!
//! - a keyed list entry is one typed step but two normalized steps: the list
//!   (`Node`) and then the entry (`Entry`);
//! - a choice has no typed step; its `Node` step is emitted before the child
//!   and the child's typed step records the case instead;
//! - an augmentation is a typed step of its own but has no normalized step;
//!   the step after it resolves inside the augmentation.
//!
//! A keyed list step without a key is a wildcard and must be the last step.

use std::sync::Arc;

use bindec_core::{NormalizedPath, PathArgument, TypeName, TypedPath, TypedPathArgument};

use crate::context::{
    ChildStep, CodecPrototype, DataObjectShape, NodeCodecContext, PathChild, PathChildKind,
};
use crate::error::CodecError;
use crate::tree::CodecTree;

/// Which augmentations a normalized path may descend into.
#[derive(Debug, Clone, Copy)]
pub enum ExtensionScope<'a> {
    /// Every augmentation known to the schema.
    Any,
    /// Only the listed augmentation types.
    Only(&'a [TypeName]),
}

impl ExtensionScope<'_> {
    pub fn allows(&self, ty: &TypeName) -> bool {
        match self {
            Self::Any => true,
            Self::Only(types) => types.contains(ty),
        }
    }
}

/// A translated normalized path and the context of the type it ends on.
pub(crate) struct Resolved {
    pub(crate) path: TypedPath,
    pub(crate) context: Arc<NodeCodecContext>,
}

enum Step {
    Extension(Arc<CodecPrototype>),
    Child(PathChild),
}

pub(crate) fn typed_to_normalized(
    tree: &CodecTree,
    path: &TypedPath,
) -> Result<NormalizedPath, CodecError> {
    let mut out = NormalizedPath::root();
    let mut current: Option<Arc<NodeCodecContext>> = None;
    for (i, arg) in path.args().iter().enumerate() {
        let last = i + 1 == path.len();
        let step = match &current {
            None => tree
                .root_child(&arg.ty)
                .cloned()
                .map(Step::Child)
                .ok_or_else(|| CodecError::unresolved(arg, "not a top-level type"))?,
            Some(ctx) => {
                let object = ctx.as_data_object()?;
                if let Some(prototype) = object.augmentation(&arg.ty) {
                    Step::Extension(Arc::clone(prototype))
                } else {
                    object
                        .path_child(&arg.ty)
                        .cloned()
                        .map(Step::Child)
                        .ok_or_else(|| {
                            CodecError::unresolved(
                                arg,
                                format!("not a child of {}", object.type_name()),
                            )
                        })?
                }
            }
        };

        let child = match step {
            Step::Extension(prototype) => {
                if arg.key.is_some() || arg.case.is_some() {
                    return Err(CodecError::unresolved(
                        arg,
                        "augmentation steps take neither key nor case",
                    ));
                }
                current = Some(prototype.get(tree)?);
                continue;
            }
            Step::Child(child) => child,
        };

        if let Some(case) = &arg.case {
            if child.case.as_ref() != Some(case) {
                return Err(CodecError::unresolved(arg, format!("type is not held by case {case}")));
            }
        }
        for choice in &child.choices {
            out.push(PathArgument::node(choice.clone()));
        }

        let context = tree.context(&arg.ty)?;
        match child.kind {
            PathChildKind::Container => {
                if arg.key.is_some() {
                    return Err(CodecError::unresolved(arg, "a container takes no key"));
                }
                out.push(PathArgument::node(child.qname));
            }
            PathChildKind::List { keyed: true } => {
                out.push(PathArgument::node(child.qname.clone()));
                match &arg.key {
                    Some(key) => {
                        let codec = context.as_data_object()?.key_codec().ok_or_else(|| {
                            CodecError::unresolved(arg, "list entry has no key codec")
                        })?;
                        out.push(PathArgument::entry(child.qname, codec.encode_key(key)?));
                    }
                    None if last => {}
                    None => {
                        return Err(CodecError::unresolved(
                            arg,
                            "a list step without a key must be the last step",
                        ))
                    }
                }
            }
            PathChildKind::List { keyed: false } => {
                if arg.key.is_some() {
                    return Err(CodecError::unresolved(arg, "list has no key"));
                }
                if !last {
                    return Err(CodecError::unresolved(arg, "cannot descend into a list without a key"));
                }
                out.push(PathArgument::node(child.qname));
            }
        }
        current = Some(context);
    }
    Ok(out)
}

enum Frame {
    Root,
    Object(Arc<NodeCodecContext>),
    Choice(Arc<NodeCodecContext>),
}

enum Next {
    Enter(Frame),
    Case(TypeName, Arc<NodeCodecContext>),
    Extension(TypeName, Arc<NodeCodecContext>),
    Child(TypeName, PathChildKind),
    Value { leaf_list: bool },
}

fn expect_node(arg: &PathArgument) -> Result<(), CodecError> {
    match arg {
        PathArgument::Node { .. } => Ok(()),
        _ => Err(CodecError::unresolved(arg, "expected a node step")),
    }
}

/// Translate `path` into a typed path. `Ok(None)` means the path is valid but
/// ends on something with no typed counterpart: the root, a choice, a leaf or
/// a leaf-set entry.
pub(crate) fn normalized_to_typed(
    tree: &CodecTree,
    path: &NormalizedPath,
    scope: ExtensionScope<'_>,
) -> Result<Option<Resolved>, CodecError> {
    let args = path.args();
    let mut typed = TypedPath::new();
    let mut frame = Frame::Root;
    let mut case: Option<TypeName> = None;
    let mut i = 0;

    while i < args.len() {
        let arg = &args[i];
        let next = match &frame {
            Frame::Root => {
                let ty = tree
                    .root_type(arg.name())
                    .ok_or_else(|| CodecError::unresolved(arg, "no top-level node of this name"))?;
                let kind = tree
                    .root_child(ty)
                    .map(|child| child.kind)
                    .ok_or_else(|| CodecError::unresolved(arg, "no top-level node of this name"))?;
                Next::Child(ty.clone(), kind)
            }
            Frame::Object(ctx) => {
                let object = ctx.as_data_object()?;
                match object.child_step(arg.name()) {
                    Some(ChildStep::Value { leaf_list }) => Next::Value { leaf_list },
                    Some(ChildStep::Data { ty, kind }) => Next::Child(ty.clone(), kind),
                    Some(ChildStep::Choice(prototype)) => Next::Enter(Frame::Choice(prototype.get(tree)?)),
                    None => {
                        let aug = object.augmentation_for_child(arg.name()).ok_or_else(|| {
                            CodecError::unresolved(arg, format!("not a child of {}", object.type_name()))
                        })?;
                        if object.shape() == DataObjectShape::Case {
                            return Err(CodecError::unresolved(
                                arg,
                                "augmented children of a case are not addressable",
                            ));
                        }
                        if !scope.allows(aug) {
                            return Err(CodecError::unresolved(
                                arg,
                                format!("augmentation {aug} is not among the candidates"),
                            ));
                        }
                        let prototype = object.augmentation(aug).ok_or_else(|| {
                            CodecError::unresolved(arg, format!("augmentation {aug} has no codec"))
                        })?;
                        Next::Extension(aug.clone(), prototype.get(tree)?)
                    }
                }
            }
            Frame::Choice(ctx) => {
                let choice = ctx.as_choice()?;
                let prototype = choice.case_for_child(arg.name()).ok_or_else(|| {
                    CodecError::unresolved(arg, format!("not a child of any case of {}", choice.type_name()))
                })?;
                Next::Case(prototype.type_name().clone(), prototype.get(tree)?)
            }
        };

        match next {
            Next::Enter(choice) => {
                expect_node(arg)?;
                frame = choice;
                i += 1;
            }
            // Case and augmentation frames reprocess the same step.
            Next::Case(ty, ctx) => {
                case = Some(ty);
                frame = Frame::Object(ctx);
            }
            Next::Extension(ty, ctx) => {
                typed.push(TypedPathArgument::item(ty));
                frame = Frame::Object(ctx);
            }
            Next::Value { leaf_list } => {
                expect_node(arg)?;
                let rest = &args[i + 1..];
                return match rest {
                    [] => Ok(None),
                    [PathArgument::Value { name, .. }] if leaf_list && name == arg.name() => Ok(None),
                    [extra, ..] => Err(CodecError::unresolved(extra, "a leaf has no children")),
                };
            }
            Next::Child(ty, kind) => {
                expect_node(arg)?;
                let ctx = tree.context(&ty)?;
                let mut step = TypedPathArgument::item(ty);
                match kind {
                    PathChildKind::Container => i += 1,
                    PathChildKind::List { keyed: true } => match args.get(i + 1) {
                        Some(PathArgument::Entry { name, key }) if name == arg.name() => {
                            let codec = ctx.as_data_object()?.key_codec().ok_or_else(|| {
                                CodecError::unresolved(arg, "list entry has no key codec")
                            })?;
                            step.key = Some(codec.decode_key(key)?);
                            i += 2;
                        }
                        None => i += 1,
                        Some(other) => {
                            return Err(CodecError::unresolved(other, "expected an entry of the list"))
                        }
                    },
                    PathChildKind::List { keyed: false } => {
                        if let Some(extra) = args.get(i + 1) {
                            return Err(CodecError::unresolved(
                                extra,
                                "cannot descend into a list without a key",
                            ));
                        }
                        i += 1;
                    }
                }
                step.case = case.take();
                typed.push(step);
                frame = Frame::Object(ctx);
            }
        }
    }

    match frame {
        Frame::Object(context) => Ok(Some(Resolved {
            path: typed,
            context,
        })),
        Frame::Root | Frame::Choice(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_scope_filters() {
        let allowed = [TypeName::from("Extra")];
        let scope = ExtensionScope::Only(&allowed);
        assert!(scope.allows(&TypeName::from("Extra")));
        assert!(!scope.allows(&TypeName::from("Other")));
        assert!(ExtensionScope::Any.allows(&TypeName::from("Other")));
    }
}
