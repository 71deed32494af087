use crate::{
    err,
    error::ErrorTree,
    node::{MasterRef, Schema, TableDef},
};

// Every bound part must point at a registered, non-part master whose
// primary key it inherits.
pub fn validate_part_masters(schema: &Schema, errs: &mut ErrorTree) {
    for part in schema.all_tables().filter(|t| t.tier.is_part()) {
        let Some(master_ref) = &part.master else {
            continue;
        };
        let ident = &part.def.ident;

        let Some(master) = schema.get(&master_ref.ident) else {
            err!(
                errs,
                "master '{}' of part table '{ident}' is not registered in schema",
                master_ref.ident
            );
            continue;
        };

        if master.tier.is_part() {
            err!(
                errs,
                "part table '{ident}' names part table '{}' as its master",
                master.def.ident
            );
            continue;
        }

        if MasterRef::capture(master) != *master_ref {
            err!(
                errs,
                "part table '{ident}' holds a stale reference to master '{}'; rebind it",
                master.def.ident
            );
        }

        validate_inherited_key(master, part, errs);
    }
}

fn validate_inherited_key(master: &TableDef, part: &TableDef, errs: &mut ErrorTree) {
    for attr in &master.heading.primary_key {
        match part.heading.primary_key.iter().find(|a| a.name == attr.name) {
            None => err!(
                errs,
                "part table '{}' must include master '{}' primary key attribute '{}' in its primary key",
                part.def.ident,
                master.def.ident,
                attr.name
            ),
            Some(inherited) if inherited.ty != attr.ty => err!(
                errs,
                "part table '{}' declares '{}' as {}, but master '{}' declares it as {}",
                part.def.ident,
                attr.name,
                inherited.ty,
                master.def.ident,
                attr.ty
            ),
            Some(_) => {}
        }
    }
}

///
/// TESTS
///
