use crate::{
    error::{Error, ErrorOrigin},
    model::{CallbackDef, ColumnDef, DelegateType},
    path::PropertyPath,
    resolve::Resolver,
    schema::{CallbackDecl, DelegateLink, Placement},
};
use std::sync::Arc;

pub(super) fn callback_def(decl: &CallbackDecl, owner: &str) -> CallbackDef {
    CallbackDef {
        name: decl.name.clone(),
        owner: owner.to_string(),
        root: None,
        callback: Arc::clone(&decl.callback),
    }
}

impl Resolver<'_> {
    /// Resolve (or fetch) one delegate, folding in its own links.
    ///
    /// `stack` holds the delegates currently being resolved; meeting one of
    /// them again is a cycle.
    pub(super) fn delegate(
        &mut self,
        name: &str,
        stack: &mut Vec<String>,
    ) -> Result<Arc<DelegateType>, Error> {
        if let Some(resolved) = self.delegates.get(name) {
            return Ok(Arc::clone(resolved));
        }
        if stack.iter().any(|pending| pending == name) {
            let mut cycle = stack.clone();
            cycle.push(name.to_string());
            return Err(Error::configuration(
                ErrorOrigin::Resolve,
                format!("delegate cycle: {}", cycle.join(" -> ")),
            ));
        }

        let catalog = self.catalog;
        let decl = catalog.delegate(name).ok_or_else(|| {
            Error::configuration(ErrorOrigin::Resolve, format!("unknown delegate '{name}'"))
        })?;

        stack.push(name.to_string());

        let mut columns = decl
            .columns
            .iter()
            .map(|column| self.column(column, name))
            .collect::<Result<Vec<_>, _>>()?;
        let mut callbacks = decl
            .callbacks
            .iter()
            .map(|callback| callback_def(callback, name))
            .collect::<Vec<_>>();

        for link in &decl.links {
            let (linked_columns, linked_callbacks) = self.link(link, stack)?;
            columns.extend(linked_columns);
            callbacks.extend(linked_callbacks);
        }

        stack.pop();

        let resolved = Arc::new(DelegateType {
            name: name.to_string(),
            columns,
            callbacks,
        });
        self.delegates.insert(name.to_string(), Arc::clone(&resolved));

        Ok(resolved)
    }

    /// Columns and callbacks a link contributes, rooted at its placement.
    pub(super) fn link(
        &mut self,
        link: &DelegateLink,
        stack: &mut Vec<String>,
    ) -> Result<(Vec<ColumnDef>, Vec<CallbackDef>), Error> {
        let delegate = self.delegate(&link.delegate, stack)?;

        let root = match &link.placement {
            Placement::Flattened => None,
            Placement::Nested { property, wire } => {
                Some(Arc::new(PropertyPath::new(None, property, wire)))
            }
        };

        let columns = delegate
            .columns
            .iter()
            .map(|column| column.rebased(root.as_ref()))
            .collect();
        let callbacks = delegate
            .callbacks
            .iter()
            .map(|callback| callback.rebased(root.as_ref()))
            .collect();

        Ok((columns, callbacks))
    }
}
