#[cfg(test)]
pub mod test {
    use std::cell::Cell;
    use std::rc::Rc;

    use crate::registry::{Function, Param, Registry};
    use crate::types::{DataType, Scalar};

    /// One parameter of every data type, named after the type, plus `conf`.
    ///
    /// Short options: `b c i l f d s`. Long options match the names.
    pub fn params() -> Vec<Param> {
        vec![
            Param::new("bool", DataType::BOOL).short('b').long("bool"),
            Param::new("char", DataType::CHAR).short('c').long("char"),
            Param::new("int", DataType::INT).short('i').long("int"),
            Param::new("long", DataType::LONG).short('l').long("long"),
            Param::new("float", DataType::FLOAT).short('f').long("float"),
            Param::new("double", DataType::DOUBLE).short('d').long("double"),
            Param::new("str", DataType::STR).short('s').long("str"),
            Param::new("bool-array", DataType::Array(Scalar::Bool)).long("bool-array"),
            Param::new("char-array", DataType::Array(Scalar::Char)).long("char-array"),
            Param::new("int-array", DataType::Array(Scalar::Int)).long("int-array"),
            Param::new("long-array", DataType::Array(Scalar::Long)).long("long-array"),
            Param::new("float-array", DataType::Array(Scalar::Float)).long("float-array"),
            Param::new("double-array", DataType::Array(Scalar::Double)).long("double-array"),
            Param::new("conf", DataType::STR)
                .long("conf")
                .help("Configuration file to read"),
        ]
    }

    pub fn register_all(reg: &mut Registry) {
        reg.add_params(params()).unwrap();
        reg.add_params(vec![
            Param::new("str-array", DataType::Array(Scalar::Str)).long("str-array"),
        ])
        .unwrap();
    }

    pub fn all_types() -> Registry {
        let mut reg = Registry::new();
        register_all(&mut reg);
        reg
    }

    pub fn noop() {}

    fn counter_function(count: &Rc<Cell<u32>>) -> Function {
        let c = Rc::clone(count);
        Function::new(move || c.set(c.get() + 1))
            .short('h')
            .long("help")
            .help("Print help and count the call")
    }

    /// [`all_types`] plus a `-h`/`--help` function counting its calls.
    pub fn with_counter() -> (Registry, Rc<Cell<u32>>) {
        let count = Rc::new(Cell::new(0));
        let mut reg = all_types();
        reg.add_functions(vec![counter_function(&count)]).unwrap();
        (reg, count)
    }

    /// Only the counting function, no parameters.
    pub fn with_counter_only() -> (Registry, Rc<Cell<u32>>) {
        let count = Rc::new(Cell::new(0));
        let mut reg = Registry::new();
        reg.add_functions(vec![counter_function(&count)]).unwrap();
        (reg, count)
    }

    #[test]
    fn fixture_registry_is_clean() {
        let (mut reg, count) = with_counter();
        assert_eq!(reg.params().count(), 15);
        assert!(reg.take_warnings().is_empty());
        assert!(reg.error().is_none());
        assert_eq!(count.get(), 0);
    }
}
