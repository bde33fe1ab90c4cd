use super::Value;
use ptree::TreeItem;
use std::borrow::Cow;

#[derive(Clone)]
struct TreeNode {
    label: String,
    value: Value,
}

impl TreeItem for TreeNode {
    type Child = Self;

    fn write_self<W: std::io::Write>(&self, f: &mut W, _: &ptree::Style) -> std::io::Result<()> {
        match &self.value {
            Value::Object(o) => write!(f, "{} object ({})", self.label, o.len()),
            Value::Array(a) => write!(f, "{} array ({})", self.label, a.len()),
            scalar => write!(f, "{} {}", self.label, scalar),
        }
    }

    fn children(&self) -> Cow<[Self::Child]> {
        match &self.value {
            Value::Object(o) => Cow::from(
                o.iter()
                    .map(|(key, value)| TreeNode {
                        label: format!("{}:", key),
                        value: value.clone(),
                    })
                    .collect::<Vec<_>>(),
            ),
            Value::Array(a) => Cow::from(
                a.iter()
                    .enumerate()
                    .map(|(index, value)| TreeNode {
                        label: format!("[{}]", index),
                        value: value.clone(),
                    })
                    .collect::<Vec<_>>(),
            ),
            _ => Cow::from(&[][..]),
        }
    }
}

impl Value {
    /// Print the value as an indented tree on standard output. This exists
    /// for debugging.
    pub fn print(&self) -> Result<(), std::io::Error> {
        ptree::print_tree(&TreeNode {
            label: ".".to_owned(),
            value: self.clone(),
        })
    }
}
