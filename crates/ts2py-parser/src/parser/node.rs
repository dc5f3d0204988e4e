//! Syntax tree node types.
//!
//! One node shape serves both trees. The concrete tree produced by the parser
//! additionally contains `Token` nodes and transparent wrappers; the lowering
//! pass removes those.

use bitflags::bitflags;

use super::base::NodeList;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Document,
    Module,
    Import,
    Interface,
    TypeAlias,
    Enum,
    EnumItem,
    Namespace,
    /// A namespace without functions, candidate for an enumeration.
    VirtualEnum,
    Const,
    Function,
    /// Computed member such as `[Symbol.iterator](): T`.
    Special,
    Declaration,
    DeclarationsBlock,
    DeclarationsTuple,
    Qualifiers,
    Readonly,
    Static,
    Optional,
    Extends,
    TypeParameters,
    ParameterTypes,
    ParameterType,
    ExtendsType,
    EqualsType,
    KeyOf,
    /// Union of one or more members.
    Types,
    Type,
    Intersection,
    GenericType,
    ArrayOf,
    TypeTuple,
    IndexedType,
    MappedType,
    MapSignature,
    IndexSignature,
    FuncType,
    ArgList,
    Argument,
    ArgTail,
    BasicType,
    TypeName,
    Identifier,
    Alias,
    Parenthesized,
    Literal,
    Integer,
    Number,
    Boolean,
    String,
    Array,
    Object,
    Association,
    Comment,
    /// Punctuation or keyword. Only present in the concrete tree.
    Token,
}

impl NodeKind {
    /// Wrappers that carry no meaning of their own once tokens are gone.
    pub const fn is_transparent(self) -> bool {
        matches!(
            self,
            NodeKind::Parenthesized | NodeKind::Alias | NodeKind::Qualifiers
        )
    }

    pub const fn is_literal_value(self) -> bool {
        matches!(
            self,
            NodeKind::Integer
                | NodeKind::Number
                | NodeKind::Boolean
                | NodeKind::String
                | NodeKind::Array
                | NodeKind::Object
        )
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u16 {
        /// Set on the document root: comments survive lowering.
        const KEEP_COMMENTS = 1 << 0;
        /// `/* ... */` comment.
        const MULTI_LINE = 1 << 1;
        /// Comment that ends a line or spans several lines.
        const STANDS_ALONE = 1 << 2;
        const EXPORTED = 1 << 3;
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub pos: u32,
    pub end: u32,
    pub flags: NodeFlags,
    pub children: NodeList,
    /// Identifier names, literal text, comment text.
    pub text: Option<String>,
}

impl Node {
    pub fn has_flag(&self, flag: NodeFlags) -> bool {
        self.flags.contains(flag)
    }

    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}
