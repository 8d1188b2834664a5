//! The migration plan: which entity types are migrated, in which order, and
//! which foreign keys they carry.

use std::collections::HashSet;

use data_migrator_shared::{EntityDescriptor, EntityType};

use crate::errors::MigrationError;

/// Ordered list of entity descriptors.
///
/// Migration runs the steps front to back; cleanup runs them back to front.
/// A valid plan never references a parent that is not migrated earlier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationPlan {
    steps: Vec<EntityDescriptor>,
}

impl MigrationPlan {
    /// Build a plan from explicit steps, rejecting inconsistent orderings.
    pub fn new(steps: Vec<EntityDescriptor>) -> Result<Self, MigrationError> {
        let plan = Self { steps };
        plan.validate()?;
        Ok(plan)
    }

    /// The fixed plan for the seven migrated entity types.
    pub fn standard() -> Self {
        Self {
            steps: vec![
                EntityDescriptor::independent(EntityType::User),
                EntityDescriptor::independent(EntityType::UserMapping),
                EntityDescriptor::independent(EntityType::Project),
                EntityDescriptor::dependent(EntityType::Issue, "projectId", EntityType::Project),
                EntityDescriptor::dependent(EntityType::CopilotPayment, "project", EntityType::Project),
                EntityDescriptor::independent(EntityType::OwnerUserTeam),
                EntityDescriptor::independent(EntityType::OwnerUserGroup),
            ],
        }
    }

    /// Check that every entity appears once and every parent precedes its
    /// dependents.
    pub fn validate(&self) -> Result<(), MigrationError> {
        let mut seen = HashSet::new();

        for step in &self.steps {
            if let Some(fk) = &step.foreign_key {
                if fk.field.is_empty() {
                    return Err(MigrationError::invalid_plan(format!(
                        "{} has a foreign key with an empty field name",
                        step.entity
                    )));
                }
                if fk.parent == step.entity {
                    return Err(MigrationError::invalid_plan(format!(
                        "{} references itself through {}",
                        step.entity, fk.field
                    )));
                }
                if !seen.contains(&fk.parent) {
                    return Err(MigrationError::invalid_plan(format!(
                        "{}.{} references {} before it is migrated",
                        step.entity, fk.field, fk.parent
                    )));
                }
            }

            if !seen.insert(step.entity) {
                return Err(MigrationError::invalid_plan(format!(
                    "{} appears more than once",
                    step.entity
                )));
            }
        }

        Ok(())
    }

    /// Steps in migration order.
    pub fn steps(&self) -> &[EntityDescriptor] {
        &self.steps
    }

    /// Entity types in cleanup order, dependents first.
    pub fn cleanup_order(&self) -> impl Iterator<Item = EntityType> + '_ {
        self.steps.iter().rev().map(|step| step.entity)
    }

    /// Whether any step rewrites a foreign key pointing at `entity`.
    pub fn is_dependency_target(&self, entity: EntityType) -> bool {
        self.steps.iter().any(|step| step.parent() == Some(entity))
    }
}

impl Default for MigrationPlan {
    fn default() -> Self {
        Self::standard()
    }
}
