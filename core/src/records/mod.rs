//! Tag-scoped registries for struct/union and enum definitions.
//!
//! Records and enums are owned by their registry for the lifetime of the
//! translation unit and addressed by copyable index references, so the
//! clone-on-share discipline of [crate::ctype::CGType] never copies a
//! definition.

#[cfg(test)]
mod tests;

use crate::CgenError;
use crate::ctype::CGType;
use std::ops::{Index, IndexMut};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordRef(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnumRef(pub u32);

/// An enum element: the enum it belongs to plus the element index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnumElemRef(pub EnumRef, pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Struct,
    Union,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordElem {
    pub name: String,
    pub etype: CGType,
}

/// A struct or union definition in progress or completed.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// C tag name; `None` for anonymous records.
    pub cname: Option<String>,
    /// IR identifier (`@@` prefixed).
    pub irident: String,
    pub kind: RecordKind,
    pub elems: Vec<RecordElem>,
    pub defined: bool,
}

impl Record {
    /// Finds a member by name, returning its index.
    pub fn find_elem(&self, name: &str) -> Option<(usize, &RecordElem)> {
        self.elems
            .iter()
            .enumerate()
            .find(|(_, elem)| elem.name == name)
    }
}

/// Registry of all records in the translation unit.
#[derive(Debug, Default)]
pub struct Records {
    recs: Vec<Record>,
}

impl Records {
    pub fn new() -> Records {
        Records::default()
    }

    pub fn create(
        &mut self,
        kind: RecordKind,
        cname: Option<String>,
        irident: String,
    ) -> RecordRef {
        let rref = RecordRef(u32::try_from(self.recs.len()).expect("record count overflow"));
        self.recs.push(Record {
            cname,
            irident,
            kind,
            elems: Vec::new(),
            defined: false,
        });
        rref
    }

    /// Appends a member. Duplicate member names are rejected.
    pub fn append(&mut self, rref: RecordRef, name: &str, etype: CGType) -> Result<(), CgenError> {
        let rec = &mut self[rref];
        if rec.find_elem(name).is_some() {
            return Err(CgenError::Exists);
        }
        rec.elems.push(RecordElem {
            name: name.to_string(),
            etype,
        });
        Ok(())
    }

    /// Size of the record in bytes: sum of element sizes for a struct, the
    /// maximum for a union. `None` while incomplete.
    pub fn size(&self, rref: RecordRef, enums: &Enums) -> Option<u64> {
        let rec = &self[rref];
        if !rec.defined {
            return None;
        }
        let mut total = 0;
        for elem in &rec.elems {
            let esize = elem.etype.sizeof(self, enums)?;
            total = match rec.kind {
                RecordKind::Struct => total + esize,
                RecordKind::Union => total.max(esize),
            };
        }
        Some(total)
    }

    /// Byte offset of the member at `index`: sum of the preceding element
    /// sizes in a struct; zero in a union.
    pub fn offset(&self, rref: RecordRef, index: usize, enums: &Enums) -> Option<u64> {
        let rec = &self[rref];
        match rec.kind {
            RecordKind::Union => Some(0),
            RecordKind::Struct => {
                let mut offset = 0;
                for elem in &rec.elems[..index] {
                    offset += elem.etype.sizeof(self, enums)?;
                }
                Some(offset)
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (RecordRef, &Record)> {
        self.recs
            .iter()
            .enumerate()
            .map(|(i, rec)| (RecordRef(i as u32), rec))
    }
}

impl Index<RecordRef> for Records {
    type Output = Record;

    fn index(&self, rref: RecordRef) -> &Record {
        &self.recs[rref.0 as usize]
    }
}

impl IndexMut<RecordRef> for Records {
    fn index_mut(&mut self, rref: RecordRef) -> &mut Record {
        &mut self.recs[rref.0 as usize]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumElem {
    pub name: String,
    pub value: i64,
}

/// An enum definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Enum {
    /// C tag name; `None` for anonymous enums.
    pub cname: Option<String>,
    pub defined: bool,
    /// True once any instance of the enum type has been declared.
    pub named: bool,
    pub elems: Vec<EnumElem>,
}

impl Enum {
    /// Strict enums are kept apart from plain integers for diagnostic
    /// purposes. An anonymous enum that never declared an instance is just
    /// a bag of integer constants and is exempt.
    pub fn strict(&self) -> bool {
        self.cname.is_some() || self.named
    }

    pub fn find_elem(&self, name: &str) -> Option<(usize, &EnumElem)> {
        self.elems
            .iter()
            .enumerate()
            .find(|(_, elem)| elem.name == name)
    }
}

/// Registry of all enums in the translation unit.
#[derive(Debug, Default)]
pub struct Enums {
    enums: Vec<Enum>,
}

impl Enums {
    pub fn new() -> Enums {
        Enums::default()
    }

    pub fn create(&mut self, cname: Option<String>) -> EnumRef {
        let eref = EnumRef(u32::try_from(self.enums.len()).expect("enum count overflow"));
        self.enums.push(Enum {
            cname,
            defined: false,
            named: false,
            elems: Vec::new(),
        });
        eref
    }

    /// Appends an enumerator. Duplicate names are rejected.
    pub fn append(&mut self, eref: EnumRef, name: &str, value: i64) -> Result<EnumElemRef, CgenError> {
        let enm = &mut self[eref];
        if enm.find_elem(name).is_some() {
            return Err(CgenError::Exists);
        }
        let index = enm.elems.len() as u32;
        enm.elems.push(EnumElem {
            name: name.to_string(),
            value,
        });
        Ok(EnumElemRef(eref, index))
    }

    /// Finds an enumerator by value. Used by the switch exhaustiveness
    /// check.
    pub fn find_value(&self, eref: EnumRef, value: i64) -> Option<EnumElemRef> {
        self[eref]
            .elems
            .iter()
            .position(|elem| elem.value == value)
            .map(|i| EnumElemRef(eref, i as u32))
    }

    pub fn elem(&self, elref: EnumElemRef) -> &EnumElem {
        &self[elref.0].elems[elref.1 as usize]
    }
}

impl Index<EnumRef> for Enums {
    type Output = Enum;

    fn index(&self, eref: EnumRef) -> &Enum {
        &self.enums[eref.0 as usize]
    }
}

impl IndexMut<EnumRef> for Enums {
    fn index_mut(&mut self, eref: EnumRef) -> &mut Enum {
        &mut self.enums[eref.0 as usize]
    }
}
