//! Datasets: named data variables sharing coordinates and dimension sizes.

use crate::array::DataArray;
use crate::attrs::{AttrValue, Attrs};
use crate::error::{Result, ValueError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A collection of data variables over shared coordinates.
///
/// Every member agrees on the size of each dimension it uses. Coordinates are
/// held once at dataset level; a data variable's view of them is rebuilt by
/// [`Dataset::variable`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DatasetDoc", into = "DatasetDoc")]
pub struct Dataset {
    coords: BTreeMap<String, DataArray>,
    data_vars: BTreeMap<String, DataArray>,
    attrs: Attrs,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_coord(mut self, name: impl Into<String>, coord: DataArray) -> Result<Self> {
        self.insert_coord(name, coord)?;
        Ok(self)
    }

    pub fn with_data_var(mut self, name: impl Into<String>, var: DataArray) -> Result<Self> {
        self.insert_data_var(name, var)?;
        Ok(self)
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    /// Merge `attrs` into the existing attributes, replacing equal keys.
    pub fn with_attrs(mut self, attrs: Attrs) -> Self {
        self.attrs.extend(attrs);
        self
    }

    /// Add or replace a dataset coordinate.
    pub fn insert_coord(&mut self, name: impl Into<String>, mut coord: DataArray) -> Result<()> {
        let name = name.into();
        self.check_sizes(&coord, Some(&name))?;
        coord.clear_coords();
        coord.set_name(name.clone());
        self.coords.insert(name, coord);
        Ok(())
    }

    /// Add or replace a data variable.
    ///
    /// Coordinates carried by `var` are lifted to dataset level unless a
    /// coordinate of the same name already exists.
    pub fn insert_data_var(&mut self, name: impl Into<String>, mut var: DataArray) -> Result<()> {
        let name = name.into();
        self.check_sizes(&var, Some(&name))?;
        for coord in var.coords().values() {
            self.check_sizes(coord, None)?;
        }
        for (coord_name, coord) in var.clear_coords() {
            self.coords.entry(coord_name).or_insert(coord);
        }
        var.set_name(name.clone());
        self.data_vars.insert(name, var);
        Ok(())
    }

    pub fn remove_coord(&mut self, name: &str) -> Option<DataArray> {
        self.coords.remove(name)
    }

    pub fn remove_data_var(&mut self, name: &str) -> Option<DataArray> {
        self.data_vars.remove(name)
    }

    pub fn coords(&self) -> &BTreeMap<String, DataArray> {
        &self.coords
    }

    pub fn coord(&self, name: &str) -> Option<&DataArray> {
        self.coords.get(name)
    }

    pub fn data_vars(&self) -> &BTreeMap<String, DataArray> {
        &self.data_vars
    }

    pub fn data_var(&self, name: &str) -> Option<&DataArray> {
        self.data_vars.get(name)
    }

    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    pub fn attrs_mut(&mut self) -> &mut Attrs {
        &mut self.attrs
    }

    /// Dimension sizes over all coordinates and data variables.
    pub fn sizes(&self) -> BTreeMap<String, usize> {
        let mut sizes = BTreeMap::new();
        for member in self.coords.values().chain(self.data_vars.values()) {
            sizes.extend(member.sizes());
        }
        sizes
    }

    /// Dimension names, sorted.
    pub fn dims(&self) -> Vec<String> {
        self.sizes().into_keys().collect()
    }

    /// A data variable with the dataset coordinates whose dimensions it
    /// covers attached, as a standalone labeled array.
    pub fn variable(&self, name: &str) -> Option<DataArray> {
        let mut var = self.data_vars.get(name)?.clone();
        for (coord_name, coord) in &self.coords {
            if coord.dims().iter().all(|d| var.dims().contains(d)) {
                // Sizes were checked on insertion.
                var.insert_coord(coord_name.clone(), coord.clone()).ok()?;
            }
        }
        Some(var)
    }

    fn check_sizes(&self, member: &DataArray, replacing: Option<&str>) -> Result<()> {
        let mut sizes = BTreeMap::new();
        for (name, existing) in self.coords.iter().chain(self.data_vars.iter()) {
            if Some(name.as_str()) == replacing {
                continue;
            }
            sizes.extend(existing.sizes());
        }
        for (dim, size) in member.sizes() {
            if let Some(existing) = sizes.get(&dim) {
                if *existing != size {
                    return Err(ValueError::SizeConflict {
                        dim,
                        existing: *existing,
                        new: size,
                    });
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct DatasetDoc {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    coords: BTreeMap<String, DataArray>,
    #[serde(default)]
    data_vars: BTreeMap<String, DataArray>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    attrs: Attrs,
}

impl From<Dataset> for DatasetDoc {
    fn from(dataset: Dataset) -> Self {
        Self {
            coords: dataset.coords,
            data_vars: dataset.data_vars,
            attrs: dataset.attrs,
        }
    }
}

impl TryFrom<DatasetDoc> for Dataset {
    type Error = ValueError;

    fn try_from(doc: DatasetDoc) -> Result<Self> {
        let mut dataset = Dataset::new().with_attrs(doc.attrs);
        for (name, coord) in doc.coords {
            dataset.insert_coord(name, coord)?;
        }
        for (name, var) in doc.data_vars {
            dataset.insert_data_var(name, var)?;
        }
        Ok(dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ArrayData, Dtype};

    fn coord(n: usize) -> DataArray {
        DataArray::new(ArrayData::arange(n, Dtype::Float64).unwrap(), ["coord"]).unwrap()
    }

    #[test]
    fn test_data_var_coords_are_lifted() {
        let var = DataArray::new(ArrayData::zeros(Dtype::Complex128, &[10]), ["coord"])
            .unwrap()
            .with_coord("coord", coord(10))
            .unwrap();
        let ds = Dataset::new().with_data_var("da", var).unwrap();

        assert!(ds.coord("coord").is_some());
        assert!(ds.data_var("da").unwrap().coords().is_empty());
        assert_eq!(ds.variable("da").unwrap().coords().len(), 1);
        assert_eq!(ds.dims(), vec!["coord".to_string()]);
    }

    #[test]
    fn test_sizes_must_agree() {
        let ds = Dataset::new().with_coord("coord", coord(10)).unwrap();
        let var = DataArray::new(ArrayData::zeros(Dtype::Float64, &[5]), ["coord"]).unwrap();
        let err = ds.with_data_var("da", var).unwrap_err();
        assert_eq!(
            err,
            ValueError::SizeConflict {
                dim: "coord".to_string(),
                existing: 10,
                new: 5
            }
        );
    }

    #[test]
    fn test_replacing_member_may_change_size() {
        let mut ds = Dataset::new().with_coord("coord", coord(10)).unwrap();
        ds.insert_coord("coord", coord(4)).unwrap();
        assert_eq!(ds.sizes()["coord"], 4);
    }

    #[test]
    fn test_json_document() {
        let ds = Dataset::new()
            .with_coord("coord", coord(3))
            .unwrap()
            .with_data_var(
                "da",
                DataArray::new(ArrayData::zeros(Dtype::Float32, &[3]), ["coord"]).unwrap(),
            )
            .unwrap()
            .with_attr("attr1", "str");
        let json = serde_json::to_string(&ds).unwrap();
        let back: Dataset = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ds);
    }
}
