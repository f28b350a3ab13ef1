//! Template resolution - folds parent chains into concrete definitions

use std::collections::HashMap;

use crate::error::ReadError;
use crate::model::{Factory, ObjectDefinition};

use super::draft::{DraftDefinition, ExtractedArgs};

/// Top-level declarations of one source, indexed by id for parent lookup
#[derive(Debug)]
pub struct TemplateSet<'a> {
    location: &'a str,
    drafts: &'a [DraftDefinition],
    by_id: HashMap<&'a str, usize>,
}

impl<'a> TemplateSet<'a> {
    pub fn new(location: &'a str, drafts: &'a [DraftDefinition]) -> Self {
        let mut by_id = HashMap::with_capacity(drafts.len());
        for (index, draft) in drafts.iter().enumerate() {
            // first declaration wins on duplicate ids
            by_id.entry(draft.id.as_str()).or_insert(index);
        }
        Self {
            location,
            drafts,
            by_id,
        }
    }

    pub fn get(&self, id: &str) -> Option<&'a DraftDefinition> {
        self.by_id.get(id).map(|&index| &self.drafts[index])
    }

    /// Resolve one declaration into its final definition.
    ///
    /// Walks `parent` links upward, merging each template's arguments beneath
    /// what has been collected so far. The result keeps the leaf's own id,
    /// scope and flags. A leaf with a parent always takes the topmost
    /// template's factory, even when that template declares none.
    pub fn resolve(&self, leaf: &DraftDefinition) -> Result<ObjectDefinition, ReadError> {
        let mut args: ExtractedArgs = leaf.args.clone();
        let mut factory: Factory = leaf.factory.clone();
        let mut chain = vec![leaf.id.clone()];
        let mut next = leaf.parent.as_deref();

        while let Some(parent_id) = next {
            if chain.iter().any(|id| id == parent_id) {
                chain.push(parent_id.to_string());
                return Err(ReadError::CircularTemplate {
                    location: self.location.to_string(),
                    chain,
                });
            }
            let parent = self
                .get(parent_id)
                .ok_or_else(|| ReadError::UnknownTemplate {
                    location: self.location.to_string(),
                    object: leaf.id.clone(),
                    parent: parent_id.to_string(),
                })?;

            tracing::debug!(object = %leaf.id, template = %parent_id, "merging template");
            args.merge_parent(&parent.args);
            if parent.parent.is_none() {
                factory = parent.factory.clone();
            }
            chain.push(parent_id.to_string());
            next = parent.parent.as_deref();
        }

        Ok(leaf.build(factory, args))
    }
}

/// Turn a source's drafts into its ordered result collection.
///
/// Each draft contributes its inline definitions followed by itself, in
/// declaration order.
pub fn resolve_templates(
    location: &str,
    drafts: &[DraftDefinition],
) -> Result<Vec<ObjectDefinition>, ReadError> {
    let templates = TemplateSet::new(location, drafts);
    let mut objects = Vec::with_capacity(drafts.len());

    for draft in drafts {
        objects.extend(draft.inner.iter().cloned());
        let definition = templates.resolve(draft)?;
        tracing::debug!(object = %definition.id, "parsed object");
        objects.push(definition);
    }

    Ok(objects)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Scope, ValueDefinition};
    use pretty_assertions::assert_eq;

    fn arg(value: &str) -> Option<ValueDefinition> {
        Some(ValueDefinition::text("constr", value))
    }

    fn template(id: &str, class: Option<&str>, parent: Option<&str>) -> DraftDefinition {
        let mut draft = DraftDefinition::new(id, Factory::from_class(class));
        draft.is_abstract = true;
        draft.parent = parent.map(str::to_string);
        draft
    }

    #[test]
    fn test_leaf_positional_wins_over_parent() {
        let mut parent = template("base", Some("app.Service"), None);
        parent.args.positional = vec![arg("A"), arg("B")];

        let mut child = DraftDefinition::new("child", Factory::Unspecified);
        child.parent = Some("base".into());
        child.scope = Scope::Prototype;
        child.args.positional = vec![None, arg("C"), arg("D")];

        let drafts = vec![parent, child];
        let objects = resolve_templates("ctx.xml", &drafts).unwrap();

        let child = &objects[1];
        assert_eq!(child.id, "child");
        assert_eq!(child.scope, Scope::Prototype);
        assert_eq!(child.factory, Factory::reflective("app.Service"));
        assert_eq!(child.parent.as_deref(), Some("base"));
        assert_eq!(child.constructor_args, vec![arg("A"), arg("C"), arg("D")]);
    }

    #[test]
    fn test_multi_level_chain_uses_topmost_factory() {
        let mut top = template("top", Some("pkg.Top"), None);
        top.args.positional = vec![arg("t0"), arg("t1"), arg("t2")];
        let mut middle = template("middle", Some("pkg.Middle"), Some("top"));
        middle.args.positional = vec![None, arg("m1")];
        let mut leaf = DraftDefinition::new("leaf", Factory::Unspecified);
        leaf.parent = Some("middle".into());
        leaf.args.positional = vec![arg("l0")];

        let drafts = vec![top, middle, leaf];
        let objects = resolve_templates("ctx.xml", &drafts).unwrap();

        let leaf = &objects[2];
        assert_eq!(leaf.factory, Factory::reflective("pkg.Top"));
        assert_eq!(leaf.constructor_args, vec![arg("l0"), arg("m1"), arg("t2")]);

        // the intermediate template is itself resolved against its parent
        assert_eq!(objects[1].constructor_args, vec![arg("t0"), arg("m1"), arg("t2")]);
    }

    #[test]
    fn test_undeclared_topmost_factory_wins() {
        let top = template("top", None, None);
        let middle = template("middle", Some("pkg.Middle"), Some("top"));
        let mut leaf = DraftDefinition::new("leaf", Factory::reflective("pkg.Leaf"));
        leaf.parent = Some("middle".into());

        let drafts = vec![top, middle, leaf];
        let objects = resolve_templates("ctx.xml", &drafts).unwrap();

        assert_eq!(objects[1].factory, Factory::Unspecified);
        assert_eq!(objects[2].factory, Factory::Unspecified);
    }

    #[test]
    fn test_unknown_parent_is_fatal() {
        let mut child = DraftDefinition::new("child", Factory::Unspecified);
        child.parent = Some("ghost".into());

        let err = resolve_templates("ctx.xml", &[child]).unwrap_err();
        assert!(matches!(
            err,
            ReadError::UnknownTemplate { ref parent, .. } if parent == "ghost"
        ));
    }

    #[test]
    fn test_cycle_is_detected() {
        let a = template("a", None, Some("b"));
        let b = template("b", None, Some("a"));

        let err = resolve_templates("ctx.xml", &[a, b]).unwrap_err();
        match err {
            ReadError::CircularTemplate { chain, .. } => {
                assert_eq!(chain, vec!["a", "b", "a"]);
            }
            other => panic!("expected cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_inline_definitions_precede_owner() {
        let mut owner = DraftDefinition::new("owner", Factory::reflective("Owner"));
        owner
            .inner
            .push(ObjectDefinition::new("owner.pool.<anonymous>", Factory::reflective("Pool")));

        let objects = resolve_templates("ctx.xml", &[owner]).unwrap();
        let ids: Vec<_> = objects.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["owner.pool.<anonymous>", "owner"]);
    }
}
