//! Function and class definition lowering.
//!
//! A definition never stands alone: `visit_array` hands it the rest of its
//! block, and the emitted `FunDef` binds the defined name in that
//! continuation. Classes expand into a block of assignments and method
//! `FunDef`s ending in `__mro__`/`__name__` stores.

use crate::ast::types::{Expr, ExprKind, Params, Stmt, StmtKind};
use crate::error::{FrontendError, Result};
use crate::thir::{LibCallKind, ThExpr, ThStmt};

use super::Translator;

impl Translator {
    // def f(p1, …, *args, k1=d, **kw): suite
    //   ==>  FunDef("f$TMP$", [p1, …, args, k1, …, kw], suite′,
    //          f = setDefault($func=f$TMP$, …); rest)
    // with a plain alias instead of setDefault for simple signatures.
    pub(crate) fn lower_function_def(&mut self, stmt: &Stmt, rest: ThStmt) -> Result<ThStmt> {
        let StmtKind::FunctionDef { name, params, body } = &stmt.kind else {
            return Err(FrontendError::malformed(
                "expected a function definition",
                stmt.range,
            ));
        };

        let fundef_name = format!("{name}$TMP$");
        let param_names = params.names();
        let fbody = self.lower_function_body(body, &param_names)?;
        let value = self.lower_callable_value(&fundef_name, params)?;

        let rest = ThStmt::seq(ThStmt::assign(ThExpr::name(name.clone()), value), rest);
        Ok(ThStmt::fun_def(fundef_name, param_names, fbody, rest).with_source(stmt.range))
    }

    /// The value bound for a freshly defined callable: an alias of the
    /// `FunDef` name when the signature is plain positional without defaults,
    /// otherwise a `setDefault` LibCall carrying default values, the
    /// vararg/kwarg names, and the keyword-only parameter count.
    fn lower_callable_value(&mut self, fundef_name: &str, params: &Params) -> Result<ThExpr> {
        let mut pairs = vec![("$func".to_string(), ThExpr::name(fundef_name))];
        for param in params.pos.iter().chain(&params.kwonly) {
            if let Some(default) = &param.default {
                pairs.push((param.name.clone(), self.visit_expr(default)?));
            }
        }
        if let Some(vararg) = &params.vararg {
            pairs.push(("$varargsName".to_string(), ThExpr::str(vararg.clone())));
        }
        if let Some(kwarg) = &params.kwarg {
            pairs.push(("$kwargsName".to_string(), ThExpr::str(kwarg.clone())));
        }
        if !params.kwonly.is_empty() {
            pairs.push((
                "$keyOnlyNum".to_string(),
                ThExpr::int(params.kwonly.len() as i64),
            ));
        }

        if pairs.len() == 1 {
            Ok(ThExpr::name(fundef_name))
        } else {
            Ok(ThExpr::libcall(LibCallKind::SetDefault, pairs))
        }
    }

    // class C(B1, …): body  expands, in order, to:
    //   C = Object()
    //   C.x = e                        for each plain class-level assignment
    //   C.__init__ = C$__init__        (user-written or synthetic default)
    //   C.m = C$m                      for each method; __call__ is stored
    //                                  as self$call, user __new__ is ignored
    //   C.__new__ = C$__new__          (synthetic)
    //   C.__call__ = C$__call__        (synthetic allocator)
    //   C.__mro__ = (C, B1, …, object)
    //   C.__name__ = "C"
    pub(crate) fn lower_class_def(&mut self, stmt: &Stmt, rest: ThStmt) -> Result<ThStmt> {
        let StmtKind::ClassDef { name, bases, body } = &stmt.kind else {
            return Err(FrontendError::malformed(
                "expected a class definition",
                stmt.range,
            ));
        };

        // Partition the class body; anything else in it is not modeled
        let mut field_assigns: Vec<(&str, &Expr)> = Vec::new();
        let mut methods: Vec<(&str, &Params, &[Stmt])> = Vec::new();
        let mut user_init: Option<(&Params, &[Stmt])> = None;
        for item in body {
            match &item.kind {
                StmtKind::Assign { targets, value } => {
                    if let [target] = targets.as_slice() {
                        if let ExprKind::Name(field) = &target.kind {
                            field_assigns.push((field, value));
                        }
                    }
                }
                StmtKind::FunctionDef {
                    name: method_name,
                    params,
                    body: method_body,
                } => match method_name.as_str() {
                    // User-defined __new__ is ignored; the synthetic one
                    // below carries the backend's allocation convention
                    "__new__" => {}
                    "__init__" => user_init = Some((params, method_body)),
                    _ => methods.push((method_name, params, method_body)),
                },
                _ => {}
            }
        }
        let has_call = methods.iter().any(|(m, ..)| *m == "__call__");

        let mut mro = vec![ThExpr::name(name.clone())];
        for base in bases {
            mro.push(self.visit_expr(base)?);
        }
        mro.push(ThExpr::name("object"));

        let mut tail = ThStmt::seq(
            ThStmt::assign(
                ThExpr::attr(ThExpr::name(name.clone()), "__mro__"),
                ThExpr::tuple(mro),
            ),
            ThStmt::seq(
                ThStmt::assign(
                    ThExpr::attr(ThExpr::name(name.clone()), "__name__"),
                    ThExpr::str(name.clone()),
                ),
                rest,
            ),
        );

        tail = self.lower_class_call(name, user_init.map(|(params, _)| params), tail);
        tail = self.lower_class_new(name, has_call, tail);
        for (method_name, params, method_body) in methods.into_iter().rev() {
            tail = self.lower_method(name, method_name, params, method_body, tail)?;
        }
        tail = match user_init {
            Some((params, init_body)) => {
                self.lower_method(name, "__init__", params, init_body, tail)?
            }
            None => self.lower_default_init(name, tail),
        };
        for (field, value) in field_assigns.into_iter().rev() {
            tail = ThStmt::seq(
                ThStmt::assign(
                    ThExpr::attr(ThExpr::name(name.clone()), field),
                    self.visit_expr(value)?,
                ),
                tail,
            );
        }

        Ok(ThStmt::seq(
            ThStmt::assign(ThExpr::name(name.clone()), ThExpr::object()),
            tail,
        )
        .with_source(stmt.range))
    }

    // A method lowers like a function, except the FunDef is named C$m, the
    // binding goes to the class attribute, and the body is wrapped so that
    // zero-argument super() can read __class__ and __self__.
    fn lower_method(
        &mut self,
        class_name: &str,
        method_name: &str,
        params: &Params,
        body: &[Stmt],
        tail: ThStmt,
    ) -> Result<ThStmt> {
        // Instances dispatch __call__ through a trampoline installed by
        // C$__new__, so the class-level method moves aside
        let attr_name = if method_name == "__call__" {
            "self$call"
        } else {
            method_name
        };
        let fundef_name = format!("{class_name}${attr_name}");

        let param_names = params.names();
        let fbody = self.lower_function_body(body, &param_names)?;
        let wrapped = wrap_method_body(class_name, &param_names, fbody);
        let value = self.lower_callable_value(&fundef_name, params)?;

        let rest = ThStmt::seq(
            ThStmt::assign(
                ThExpr::attr(ThExpr::name(class_name), attr_name),
                value,
            ),
            tail,
        );
        Ok(ThStmt::fun_def(fundef_name, param_names, wrapped, rest))
    }

    // def __init__(self, *args, **kw): super().__init__(*args, **kw)
    fn lower_default_init(&mut self, class_name: &str, tail: ThStmt) -> ThStmt {
        let fundef_name = format!("{class_name}$__init__");
        let params = vec!["self".to_string(), "args".to_string(), "kw".to_string()];

        let delegate = ThExpr::libcall(
            LibCallKind::CallKV,
            vec![
                (
                    "$func".to_string(),
                    ThExpr::attr(
                        ThExpr::libcall(
                            LibCallKind::Super,
                            vec![
                                ("baseClass".to_string(), ThExpr::name("__class__")),
                                ("self".to_string(), ThExpr::name("__self__")),
                            ],
                        ),
                        "__init__",
                    ),
                ),
                ("$varargs".to_string(), ThExpr::name("args")),
                ("$kwargs".to_string(), ThExpr::name("kw")),
            ],
        );
        let body = ThStmt::seq(ThStmt::expr(delegate), ThStmt::return_(ThExpr::none()));
        let wrapped = wrap_method_body(class_name, &params, body);

        let value = ThExpr::libcall(
            LibCallKind::SetDefault,
            vec![
                ("$func".to_string(), ThExpr::name(&fundef_name)),
                ("$varargsName".to_string(), ThExpr::str("args")),
                ("$kwargsName".to_string(), ThExpr::str("kw")),
            ],
        );
        let rest = ThStmt::seq(
            ThStmt::assign(
                ThExpr::attr(ThExpr::name(class_name), "__init__"),
                value,
            ),
            tail,
        );
        ThStmt::fun_def(fundef_name, params, wrapped, rest)
    }

    // def __new__(cls):
    //     self = super(C, cls).__new__(C)
    //     self.$addr = self              (objects self-identify by address)
    //     [self.__call__ = bound forwarder to self$call]
    //     return self
    fn lower_class_new(&mut self, class_name: &str, has_call: bool, tail: ThStmt) -> ThStmt {
        let fundef_name = format!("{class_name}$__new__");

        let alloc = ThExpr::call(
            ThExpr::attr(
                ThExpr::libcall(
                    LibCallKind::Super,
                    vec![
                        ("baseClass".to_string(), ThExpr::name(class_name)),
                        ("self".to_string(), ThExpr::name("cls")),
                    ],
                ),
                "__new__",
            ),
            vec![ThExpr::name(class_name)],
        );

        let set_addr = ThStmt::assign(
            ThExpr::attr(ThExpr::name("self"), "$addr"),
            ThExpr::name("self"),
        );
        let finish = ThStmt::return_(ThExpr::name("self"));

        let inner = if has_call {
            // Bound instance method that forwards to the class's self$call
            let forwarder_name = format!("{class_name}$call");
            let forward = ThExpr::libcall(
                LibCallKind::CallKV,
                vec![
                    (
                        "$func".to_string(),
                        ThExpr::attr(ThExpr::name("self"), "self$call"),
                    ),
                    ("$varargs".to_string(), ThExpr::name("args")),
                    ("$kwargs".to_string(), ThExpr::name("kw")),
                ],
            );
            let forwarder_value = ThExpr::libcall(
                LibCallKind::SetDefault,
                vec![
                    ("$func".to_string(), ThExpr::name(&forwarder_name)),
                    ("$varargsName".to_string(), ThExpr::str("args")),
                    ("$kwargsName".to_string(), ThExpr::str("kw")),
                ],
            );
            let forwarder = ThStmt::fun_def(
                forwarder_name,
                vec!["args".to_string(), "kw".to_string()],
                ThStmt::return_(forward),
                ThStmt::seq(
                    ThStmt::assign(
                        ThExpr::attr(ThExpr::name("self"), "__call__"),
                        forwarder_value,
                    ),
                    finish,
                ),
            );
            ThStmt::seq(set_addr, forwarder)
        } else {
            ThStmt::seq(set_addr, finish)
        };

        let body = ThStmt::let_("self", inner, Some(alloc));
        let rest = ThStmt::seq(
            ThStmt::assign(
                ThExpr::attr(ThExpr::name(class_name), "__new__"),
                ThExpr::name(&fundef_name),
            ),
            tail,
        );
        ThStmt::fun_def(fundef_name, vec!["cls".to_string()], body, rest)
    }

    // def __call__(…):
    //     self = C.__new__(C)
    //     self.__mro__ = C.__mro__
    //     C.__init__(self, …)
    //     return self
    //
    // When __init__ takes only simple positional parameters the allocator
    // inherits its parameter names, so plain C(1, 2) stays a direct Call;
    // otherwise it takes (*args, **kw) and dispatches through callKV.
    fn lower_class_call(
        &mut self,
        class_name: &str,
        init_params: Option<&Params>,
        tail: ThStmt,
    ) -> ThStmt {
        let fundef_name = format!("{class_name}$__call__");

        let alloc = ThExpr::call(
            ThExpr::attr(ThExpr::name(class_name), "__new__"),
            vec![ThExpr::name(class_name)],
        );
        let copy_mro = ThStmt::assign(
            ThExpr::attr(ThExpr::name("self"), "__mro__"),
            ThExpr::attr(ThExpr::name(class_name), "__mro__"),
        );

        let inherited: Option<Vec<String>> = init_params.and_then(|params| {
            (params.is_simple_positional() && !params.pos.is_empty())
                .then(|| params.pos[1..].iter().map(|p| p.name.clone()).collect())
        });

        let (params, init_call, value) = match inherited {
            Some(params) => {
                let mut call_args = vec![ThExpr::name("self")];
                call_args.extend(params.iter().map(|p| ThExpr::name(p.clone())));
                let init_call = ThExpr::call(
                    ThExpr::attr(ThExpr::name(class_name), "__init__"),
                    call_args,
                );
                (params, init_call, ThExpr::name(&fundef_name))
            }
            None => {
                let init_call = ThExpr::libcall(
                    LibCallKind::CallKV,
                    vec![
                        (
                            "$func".to_string(),
                            ThExpr::attr(ThExpr::name(class_name), "__init__"),
                        ),
                        ("param$0".to_string(), ThExpr::name("self")),
                        ("$varargs".to_string(), ThExpr::name("args")),
                        ("$kwargs".to_string(), ThExpr::name("kw")),
                    ],
                );
                let value = ThExpr::libcall(
                    LibCallKind::SetDefault,
                    vec![
                        ("$func".to_string(), ThExpr::name(&fundef_name)),
                        ("$varargsName".to_string(), ThExpr::str("args")),
                        ("$kwargsName".to_string(), ThExpr::str("kw")),
                    ],
                );
                (vec!["args".to_string(), "kw".to_string()], init_call, value)
            }
        };

        let body = ThStmt::let_(
            "self",
            ThStmt::seq(
                copy_mro,
                ThStmt::seq(
                    ThStmt::expr(init_call),
                    ThStmt::return_(ThExpr::name("self")),
                ),
            ),
            Some(alloc),
        );
        let rest = ThStmt::seq(
            ThStmt::assign(
                ThExpr::attr(ThExpr::name(class_name), "__call__"),
                value,
            ),
            tail,
        );
        ThStmt::fun_def(fundef_name, params, body, rest)
    }
}

/// Method bodies read `__class__`/`__self__` when lowering `super()`; bind
/// them around the body.
fn wrap_method_body(class_name: &str, params: &[String], body: ThStmt) -> ThStmt {
    let self_init = params.first().map(|p| ThExpr::name(p.clone()));
    ThStmt::let_(
        "__class__",
        ThStmt::let_("__self__", body, self_init),
        Some(ThExpr::name(class_name)),
    )
}
