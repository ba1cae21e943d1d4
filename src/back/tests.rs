//! Back-end tests: compile C snippets and check the emitted assembly.

use crate::back::codegen::generate;
use crate::back::context::CodegenError;
use crate::front::parse;

fn compile(source: &str) -> String {
    let program = parse(source).unwrap();
    generate(&program).unwrap()
}

fn compile_err(source: &str) -> CodegenError {
    let program = parse(source).unwrap();
    generate(&program).unwrap_err()
}

fn count(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}

// ----- functions, prologue and epilogue -----

#[test]
fn function_prologue_and_epilogue() {
    let asm = compile("int main() { return 0; }");
    assert!(asm.contains("    .text\n"));
    assert!(asm.contains("    .globl main\n"));
    assert!(asm.contains("    .type main, @function\n"));
    assert!(asm.contains("main:\n"));
    assert_eq!(count(&asm, "addi sp, sp, -1024"), 1);
    assert_eq!(count(&asm, "sw ra, 1020(sp)"), 1);
    assert_eq!(count(&asm, "sw s0, 1016(sp)"), 1);
    assert_eq!(count(&asm, "mv s0, sp"), 1);
    assert_eq!(count(&asm, "jr ra"), 1);
    assert!(asm.contains("func_end_0:"));
}

#[test]
fn one_epilogue_per_function() {
    let asm = compile("int f() { return 1; }\nint g() { return 2; }");
    assert_eq!(count(&asm, "jr ra"), 2);
    assert_eq!(count(&asm, "addi sp, sp, 1024"), 2);
}

#[test]
fn prototype_emits_nothing() {
    let asm = compile("int add(int a, int b);");
    assert!(!asm.contains("add:"));
    assert!(!asm.contains(".text"));
}

#[test]
fn return_moves_into_a0_and_jumps_to_end() {
    let asm = compile("int f() { return 7; }");
    assert!(asm.contains("li t0, 7"));
    assert!(asm.contains("mv a0, t0"));
    assert!(asm.contains("j func_end_0"));
}

#[test]
fn float_return_moves_into_fa0() {
    let asm = compile("float f() { float a = 1.5f; return a; }");
    assert!(asm.contains("fmv.s fa0, "));
}

#[test]
fn register_parameters_spill_to_their_slots() {
    let asm = compile("int add(int a, int b) { return a + b; }");
    assert!(asm.contains("sw a0, 0(s0)"));
    assert!(asm.contains("sw a1, 4(s0)"));
}

#[test]
fn parameter_classes_have_separate_counters() {
    let asm = compile("int f(int a, float x, int b) { return a + b; }");
    assert!(asm.contains("sw a0, 0(s0)"));
    assert!(asm.contains("fsw fa0, 4(s0)"));
    // the third parameter is the second integer, so it arrives in a1
    assert!(asm.contains("sw a1, 8(s0)"));
}

// ----- globals -----

#[test]
fn global_int_initializer_keeps_its_value() {
    let asm = compile("int g = 42;");
    assert!(asm.contains("    .data\n"));
    assert!(asm.contains("    .globl g\n"));
    assert!(asm.contains("g:\n    .word 42\n"));
}

#[test]
fn global_float_initializer_is_bit_punned() {
    let asm = compile("float pi = 3.25f;");
    let bits = 3.25f32.to_bits();
    assert!(asm.contains(&format!(".word {bits}")));
}

#[test]
fn global_double_initializer_is_two_words_little_endian() {
    let asm = compile("double d = 2.5;");
    let bits = 2.5f64.to_bits();
    let lo = bits as u32;
    let hi = (bits >> 32) as u32;
    assert!(asm.contains(&format!(".word {lo}\n    .word {hi}")));
}

#[test]
fn global_char_initializer_is_a_byte() {
    let asm = compile("char c = 'A';");
    assert!(asm.contains(".byte 65"));
}

#[test]
fn uninitialized_global_reserves_zeroed_storage() {
    let asm = compile("int g;\ndouble d;");
    assert!(asm.contains(".zero 4"));
    assert!(asm.contains(".zero 8"));
}

#[test]
fn global_array_pads_to_declared_count() {
    let asm = compile("int a[5] = {1, 2, 3};");
    assert_eq!(count(&asm, ".word "), 5);
    assert_eq!(count(&asm, ".word 0"), 2);
}

#[test]
fn global_char_array_pads_bytes_and_realigns() {
    let asm = compile("char s[5] = {'h', 'i'};");
    assert_eq!(count(&asm, ".byte "), 5);
    assert!(asm.contains(".byte 104"));
    assert!(asm.contains(".byte 105"));
    // 5 bytes leave the section misaligned
    assert_eq!(count(&asm, ".align 2"), 2);
}

#[test]
fn uninitialized_global_array_is_zeroed_whole() {
    let asm = compile("int table[10];");
    assert!(asm.contains(".zero 40"));
}

#[test]
fn global_load_goes_through_hi_lo() {
    let asm = compile("int g = 1;\nint f() { return g; }");
    assert!(asm.contains("lui t0, %hi(g)"));
    assert!(asm.contains("lw t1, %lo(g)(t0)"));
}

#[test]
fn global_store_goes_through_hi_lo() {
    let asm = compile("int g;\nint f() { g = 5; return g; }");
    assert!(asm.contains("addi t1, t1, %lo(g)"));
    assert!(asm.contains("sw t0, 0(t1)"));
}

// ----- rodata pools -----

#[test]
fn float_literals_intern_once_per_value() {
    let asm = compile("float f() { return 1.5f + 1.5f + 2.5f; }");
    assert_eq!(count(&asm, ".FLC_1:"), 1);
    assert_eq!(count(&asm, ".FLC_2:"), 1);
    assert!(!asm.contains(".FLC_3"));
    let bits = 1.5f32.to_bits();
    assert!(asm.contains(&format!(".FLC_1:\n    .word {bits}")));
}

#[test]
fn double_pool_emits_rodata_section() {
    let asm = compile("double f() { return 1.25; }");
    assert!(asm.contains("    .section    .rodata\n.DLC_1:"));
    assert!(asm.contains("fld "));
}

#[test]
fn string_literals_intern_with_quotes() {
    let asm = compile("int f(char *s);\nint g() { return f(\"hi\"); }");
    assert!(asm.contains("lui t0,%hi(.SLC_1)"));
    assert!(asm.contains(".SLC_1:\n    .string \"hi\"\n"));
}

// ----- locals, arrays, pointers -----

#[test]
fn local_array_initializer_stores_each_element() {
    let asm = compile("int f() { int a[3] = {1, 2, 3}; return a[0]; }");
    assert!(asm.contains("sw t0, 0(s0)"));
    assert!(asm.contains("sw t0, 4(s0)"));
    assert!(asm.contains("sw t0, 8(s0)"));
}

#[test]
fn local_array_read_scales_the_index() {
    let asm = compile("int f() { int a[5]; int i = 2; return a[i]; }");
    // index is scaled by the element size, then offset from s0
    assert!(asm.contains("li t1, 4"));
    assert!(asm.contains("mul t1, t0, t1"));
    assert!(asm.contains("add t1, s0, t1"));
    assert!(asm.contains("addi t1, t1, 0"));
    assert!(asm.contains("lw t2, 0(t1)"));
}

#[test]
fn char_array_uses_byte_loads() {
    let asm = compile("int f() { char s[4] = {'a', 'b', 'c', 'd'}; return s[1]; }");
    assert!(asm.contains("sb "));
    assert!(asm.contains("lbu "));
}

#[test]
fn address_of_is_frame_relative() {
    let asm = compile("int f() { int x = 3; int *p = &x; return x; }");
    assert!(asm.contains("addi t0, s0, 0"));
    // the pointer itself is stored like any word
    assert!(asm.contains("sw t0, 4(s0)"));
}

#[test]
fn dereference_loads_through_the_pointer() {
    let asm = compile("int f() { int x = 3; int *p = &x; return *p; }");
    assert!(asm.contains("lw t0, 0(t0)"));
}

#[test]
fn store_through_pointer() {
    let asm = compile("int f() { int x = 3; int *p = &x; *p = 7; return x; }");
    assert!(asm.contains("sw t0, 0(t1)"));
}

#[test]
fn pointer_addition_scales_by_pointee_size() {
    let asm = compile("int f(int *p) { return *(p + 2); }");
    assert!(asm.contains("li t3, 4"));
    assert!(asm.contains("mul t1, t1, t3"));
    assert!(asm.contains("add t2, t0, t1"));
}

#[test]
fn char_pointer_scales_by_one() {
    let asm = compile("int f(char *p) { return *(p + 2); }");
    assert!(asm.contains("li t3, 1"));
}

#[test]
fn pointer_difference_divides_by_pointee_size() {
    let asm = compile("int f(int *p, int *q) { return p - q; }");
    assert!(asm.contains("sub t2, t0, t1"));
    assert!(asm.contains("div t2, t2, t3"));
}

// ----- operators -----

#[test]
fn integer_arithmetic_mnemonics() {
    let asm = compile("int f() { int a = 5, b = 3; return a + b * 2 - a / b; }");
    assert!(asm.contains("mul "));
    assert!(asm.contains("add "));
    assert!(asm.contains("div "));
    assert!(asm.contains("sub "));
}

#[test]
fn modulo_uses_rem() {
    let asm = compile("int f(int a, int b) { return a % b; }");
    assert!(asm.contains("rem "));
}

#[test]
fn comparisons_materialize_zero_or_one() {
    let asm = compile("int f(int a, int b) { return a <= b; }");
    assert!(asm.contains("sgt "));
    assert!(asm.contains("xori "));
}

#[test]
fn equality_is_xor_then_seqz() {
    let asm = compile("int f(int a, int b) { return a == b; }");
    assert!(asm.contains("xor "));
    assert!(asm.contains("seqz "));
}

#[test]
fn char_comparisons_are_unsigned() {
    let asm = compile("int f() { char a = 'a', b = 'b'; return a < b; }");
    assert!(asm.contains("sltu "));
}

#[test]
fn char_arithmetic_stays_integer() {
    let asm = compile("int f() { char a = 'a', b = 'b'; return a + b; }");
    assert!(asm.contains("add t2, t0, t1"));
}

#[test]
fn float_arithmetic_uses_single_suffix() {
    let asm = compile("float f() { float a = 1.5f, b = 2.25f; return a * b + 0.25f; }");
    assert!(asm.contains("fmul.s "));
    assert!(asm.contains("fadd.s "));
    assert!(asm.contains("flw "));
}

#[test]
fn double_arithmetic_uses_double_suffix() {
    let asm = compile("double f() { double a = 1.5, b = 2.0; return a * b; }");
    assert!(asm.contains("fmul.d "));
}

#[test]
fn float_comparison_result_is_an_integer_register() {
    let asm = compile("int f() { float a = 1.0f, b = 2.0f; return a < b; }");
    assert!(asm.contains("flt.s t0, ft0, ft1"));
}

#[test]
fn float_inequality_flips_feq() {
    let asm = compile("int f() { float a = 1.0f, b = 2.0f; return a != b; }");
    assert!(asm.contains("feq.s t0, "));
    assert!(asm.contains("xori t0, t0, 1"));
}

#[test]
fn shifts_use_sll_and_sra() {
    let asm = compile("int f(int a, int b) { return (a << b) + (a >> b); }");
    assert!(asm.contains("sll "));
    assert!(asm.contains("sra "));
}

#[test]
fn unary_operators() {
    let asm = compile("int f(int a) { return -a + !a + ~a; }");
    assert!(asm.contains("neg "));
    assert!(asm.contains("seqz "));
    assert!(asm.contains("not "));
}

#[test]
fn negated_float_uses_fneg() {
    let asm = compile("float f() { float a = 1.5f; return -a; }");
    assert!(asm.contains("fneg.s "));
}

#[test]
fn pre_increment_publishes_updated_value() {
    let asm = compile("int f() { int x = 1; return ++x; }");
    assert!(asm.contains("addi t0, t0, 1"));
    assert!(asm.contains("sw t0, 0(s0)"));
}

#[test]
fn post_increment_publishes_original_value() {
    let asm = compile("int f() { int x = 1; return x++; }");
    // the original value is copied out before the update is stored
    assert!(asm.contains("mv t0, t1"));
    assert!(asm.contains("addi t1, t1, 1"));
    assert!(asm.contains("sw t1, 0(s0)"));
}

#[test]
fn compound_assignment_loads_ops_and_stores() {
    let asm = compile("int f() { int s = 0; s += 4; return s; }");
    assert!(asm.contains("lw t0, 0(s0)"));
    assert!(asm.contains("add t2, t0, t1"));
    assert!(asm.contains("sw t2, 0(s0)"));
}

#[test]
fn short_circuit_and_skips_right_operand() {
    let asm = compile("int g();\nint f(int a) { return a && g(); }");
    // the branch on the left operand appears before the call
    let branch = asm.find("beqz t1, logical_and_").unwrap();
    let call = asm.find("call g").unwrap();
    assert!(branch < call);
    assert!(asm.contains("li t0, 1"));
    assert!(asm.contains("li t0, 0"));
}

#[test]
fn short_circuit_or_has_three_labels() {
    let asm = compile("int f(int a, int b) { return a || b; }");
    assert!(asm.contains("bnez t1, logical_or_1"));
    assert!(asm.contains("beqz t1, logical_or_2"));
    assert!(asm.contains("logical_or_1:"));
    assert!(asm.contains("logical_or_2:"));
    assert!(asm.contains("logical_or_3:"));
}

#[test]
fn conditional_operator_branches_and_moves() {
    let asm = compile("int f(int c) { return c ? 1 : 2; }");
    assert!(asm.contains("beqz t1, cond_false_1"));
    assert!(asm.contains("cond_false_1:"));
    assert!(asm.contains("cond_end_2:"));
    assert_eq!(count(&asm, "mv t0, "), 2);
}

#[test]
fn comma_discards_the_left_value() {
    let asm = compile("int f() { int a = 1; return (a = 2, a); }");
    assert!(asm.contains("lw "));
}

#[test]
fn sizeof_array_multiplies_by_element_count() {
    let asm = compile("int f() { int a[5]; return sizeof a; }");
    assert!(asm.contains("li t0, 20"));
}

#[test]
fn sizeof_type_is_a_constant() {
    let asm = compile("int f() { return sizeof(double); }");
    assert!(asm.contains("li t0, 8"));
}

#[test]
fn sizeof_scalar_expression_is_its_type_size() {
    let asm = compile("int f() { char c = 'x'; return sizeof c; }");
    assert!(asm.contains("li t0, 1"));
}

// ----- control flow -----

#[test]
fn if_without_else_emits_one_label() {
    let asm = compile("int f(int a) { if (a) return 1; return 0; }");
    assert!(asm.contains("beqz t0, if_else_1"));
    assert!(asm.contains("if_else_1:"));
    assert!(!asm.contains("if_end_2:"));
}

#[test]
fn if_else_jumps_over_the_else_branch() {
    let asm = compile("int f(int a) { if (a) return 1; else return 2; }");
    assert!(asm.contains("j if_end_2"));
    assert!(asm.contains("if_else_1:"));
    assert!(asm.contains("if_end_2:"));
}

#[test]
fn while_loop_tests_at_the_top() {
    let asm = compile("int f() { int i = 0; while (i < 5) i = i + 1; return i; }");
    assert!(asm.contains("while_start_1:"));
    assert!(asm.contains("beqz t2, while_end_2"));
    assert!(asm.contains("j while_start_1"));
    assert!(asm.contains("while_end_2:"));
}

#[test]
fn do_while_tests_at_the_bottom() {
    let asm = compile("int f() { int i = 0; do i = i + 1; while (i < 5); return i; }");
    assert!(asm.contains("do_start_1:"));
    assert!(asm.contains("bnez t2, do_start_1"));
}

#[test]
fn for_loop_shape() {
    let asm = compile("int f() { int s = 0; for (int i = 0; i < 5; i++) s += i; return s; }");
    assert!(asm.contains("for_init_1:"));
    assert!(asm.contains("j for_cond_2"));
    assert!(asm.contains("for_body_4:"));
    assert!(asm.contains("for_incr_3:"));
    assert!(asm.contains("bnez t2, for_body_4"));
    assert!(asm.contains("for_end_5:"));
}

#[test]
fn for_without_condition_jumps_unconditionally() {
    let asm = compile("int f() { for (;;) break; return 0; }");
    assert!(asm.contains("j for_body_4"));
    assert!(asm.contains("j for_end_5"));
}

#[test]
fn break_and_continue_target_the_innermost_loop() {
    let asm = compile(
        "int f() { int i = 0; while (1) { i++; if (i > 3) break; continue; } return i; }",
    );
    assert!(asm.contains("j while_end_2"));
    assert!(asm.contains("j while_start_1"));
}

#[test]
fn sequential_for_loops_can_reuse_the_index_name() {
    let asm = compile(
        "int f() { int s = 0; for (int i = 0; i < 2; i++) s += i; \
         for (int i = 0; i < 2; i++) s += i; return s; }",
    );
    assert_eq!(count(&asm, "for_init"), 2);
}

#[test]
fn switch_tests_each_case_once() {
    let asm = compile(
        "int f(int x) { switch (x) { case 1: return 1; case 2: return 2; case 3: return 3; \
         default: return 9; } }",
    );
    // one beq per non-default case, each into its own case label
    assert_eq!(count(&asm, "beq t0, "), 3);
    assert_eq!(count(&asm, "j next_case_"), 3);
    assert!(asm.contains("switch_end_1:"));
}

#[test]
fn switch_cases_fall_through() {
    let asm = compile(
        "int f(int x) { int r = 0; switch (x) { case 1: r += 1; case 2: r += 2; break; } \
         return r; }",
    );
    // case 1's body runs into the deferred next-case label, which is emitted
    // just before case 2's dispatch; no jump to the end intervenes
    let case1 = asm.find("case_2:").unwrap();
    let pending = asm.find("next_case_3:").unwrap();
    let case2 = asm.find("case_4:").unwrap();
    assert!(case1 < pending && pending < case2);
    assert_eq!(count(&asm[case1..case2], "j switch_end_1"), 0);
    assert!(asm.contains("j switch_end_1"));
}

#[test]
fn goto_and_labels_translate_directly() {
    let asm = compile("int f() { int i = 0; again: i++; if (i < 3) goto again; return i; }");
    assert!(asm.contains("again:"));
    assert!(asm.contains("j again"));
}

// ----- calls -----

#[test]
fn call_places_arguments_by_class() {
    let asm = compile(
        "int h(int a, float x, int b);\nint f() { float y = 1.5f; return h(1, y, 2); }",
    );
    assert!(asm.contains("mv a0, "));
    assert!(asm.contains("fmv.s fa0, "));
    assert!(asm.contains("mv a1, "));
    assert!(asm.contains("call h"));
}

#[test]
fn call_result_is_copied_out_of_a0() {
    let asm = compile("int g();\nint f() { int x = g(); return x + 1; }");
    assert!(asm.contains("call g"));
    assert!(asm.contains("mv t0, a0"));
}

#[test]
fn double_return_is_copied_out_of_fa0() {
    let asm = compile("double g();\ndouble f() { double x = g(); return x; }");
    assert!(asm.contains("fmv.d ft0, fa0"));
}

#[test]
fn ninth_argument_goes_on_the_stack() {
    let asm = compile(
        "int h(int a, int b, int c, int d, int e, int f, int g, int h, int i);\n\
         int f() { return h(1, 2, 3, 4, 5, 6, 7, 8, 9); }",
    );
    assert!(asm.contains("addi sp, sp, -16"));
    assert!(asm.contains("sw t0, 0(sp)"));
    assert!(asm.contains("mv a7, "));
    assert!(asm.contains("addi sp, sp, 16"));
}

#[test]
fn live_registers_are_saved_around_calls() {
    let asm = compile("int g();\nint f() { int a = 1; return a + g(); }");
    // `a` lives in t0 across the call
    assert!(asm.contains("sw t0, 0(sp)"));
    assert!(asm.contains("call g"));
    assert!(asm.contains("lw t0, 0(sp)"));
}

#[test]
fn stack_arguments_and_live_registers_compose() {
    let asm = compile(
        "int h(int a, int b, int c, int d, int e, int f, int g, int h, int i);\n\
         int f() { int k = 5; return k + h(1, 2, 3, 4, 5, 6, 7, 8, 9); }",
    );
    // two separate sp adjustments: the argument area, then the save area
    assert_eq!(count(&asm, "addi sp, sp, -16"), 2);
    // the ninth argument lands in the argument area, `k` in the save area
    assert!(asm.contains("sw t1, 0(sp)"));
    assert!(asm.contains("sw t0, 0(sp)"));
    // the restore reads the offset the save wrote, before the argument
    // area is popped
    let call = asm.find("call h").unwrap();
    let restore = asm.find("lw t0, 0(sp)").unwrap();
    let last_pop = asm.rfind("addi sp, sp, 16").unwrap();
    assert!(call < restore && restore < last_pop);
    assert_eq!(count(&asm, "addi sp, sp, 16"), 2);
}

#[test]
fn recursion_compiles() {
    let asm = compile(
        "int fib(int n) { if (n < 2) return n; return fib(n - 1) + fib(n - 2); }\n\
         int main() { return fib(10); }",
    );
    assert_eq!(count(&asm, "call fib"), 3);
    assert!(asm.contains("fib:"));
    assert!(asm.contains("main:"));
}

// ----- enums -----

#[test]
fn enumerators_are_integer_constants() {
    let asm = compile("enum Color { RED, GREEN = 5, BLUE };\nint f() { return BLUE; }");
    assert!(asm.contains("li t0, 6"));
    // no storage is allocated for enumerators
    assert!(!asm.contains(".data"));
}

#[test]
fn anonymous_enums_work() {
    let asm = compile("enum { A = 2, B };\nint f() { return A + B; }");
    assert!(asm.contains("li t0, 2"));
    assert!(asm.contains("li t1, 3"));
}

// ----- stack parameters -----

#[test]
fn ninth_parameter_is_read_from_the_callers_frame() {
    let asm = compile(
        "int f(int a, int b, int c, int d, int e, int g, int h, int i, int j) { return j; }",
    );
    // 1024 + (8 - 8) * 4, addressed from sp
    assert!(asm.contains("lw t0, 1024(sp)"));
}

// ----- errors -----

#[test]
fn undefined_variable_is_fatal() {
    let err = compile_err("int f() { return missing; }");
    assert!(matches!(err, CodegenError::UndefinedVariable(_)));
}

#[test]
fn redeclaration_is_fatal() {
    let err = compile_err("int f() { int x = 1; int x = 2; return x; }");
    assert!(matches!(err, CodegenError::Redeclaration(_)));
}

#[test]
fn member_access_is_rejected() {
    let err = compile_err("int f() { int s; return s.field; }");
    assert!(matches!(err, CodegenError::Unsupported(_)));
}

#[test]
fn pointer_member_access_is_rejected() {
    let err = compile_err("int f(int *p) { return p->field; }");
    assert!(matches!(err, CodegenError::Unsupported(_)));
}

#[test]
fn break_outside_a_loop_is_rejected() {
    let err = compile_err("int f() { break; return 0; }");
    assert!(matches!(err, CodegenError::Unsupported(_)));
}

#[test]
fn address_of_unknown_name_is_fatal() {
    let err = compile_err("int f() { return *(&missing); }");
    assert!(matches!(err, CodegenError::UndefinedVariable(_)));
}

#[test]
fn frame_overflow_is_reported() {
    let err = compile_err("int f() { int a[300]; return 0; }");
    assert!(matches!(err, CodegenError::StackOverflow));
}

// ----- end-to-end shapes -----

#[test]
fn arithmetic_program_compiles_in_order() {
    let asm = compile("int f() { int a = 5, b = 3; return a + b * 2 - a / b; }");
    let mul = asm.find("mul ").unwrap();
    let add = asm.find("add ").unwrap();
    let div = asm.find("div ").unwrap();
    let sub = asm.find("sub ").unwrap();
    assert!(mul < add && add < div && div < sub);
}

#[test]
fn array_sum_loop_compiles() {
    let asm = compile(
        "int main() { int a[5] = {1, 2, 3, 4, 5}; int s = 0; \
         for (int i = 0; i < 5; i++) s += a[i]; return s; }",
    );
    assert!(asm.contains("for_cond"));
    assert!(asm.contains("mul "));
    assert!(asm.contains("add "));
}

#[test]
fn pointer_update_program_compiles() {
    let asm = compile("int main() { int x = 3; int *p = &x; *p = *p + 4; return x; }");
    assert!(asm.contains("addi t0, s0, 0"));
    assert!(asm.contains("lw "));
    assert!(asm.contains("sw "));
}

#[test]
fn float_expression_program_compiles() {
    let asm = compile("float main() { float a = 1.5f, b = 2.25f; return a * b + 0.25f; }");
    assert!(asm.contains("fmul.s "));
    assert!(asm.contains("fadd.s "));
    assert!(asm.contains("fmv.s fa0, "));
    // three distinct constants, three rodata labels
    assert!(asm.contains(".FLC_1:"));
    assert!(asm.contains(".FLC_2:"));
    assert!(asm.contains(".FLC_3:"));
    assert!(!asm.contains(".FLC_4"));
}
