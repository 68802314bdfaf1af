/*!
# Errors

Errors print with the address of the instruction that caused them,
relative to its virtual machine when one was running.

```text
NUMBER OVERFLOW IN 002; 99999 + 1 = 100000 DOES NOT FIT IN A WORD
```

Inside a virtual machine the first six are program interrupts and the
machine carries on with the next instruction. Everywhere else, and for
the remaining ones, the emulator stops.

| error               | program interrupt |
|---------------------|-------------------|
| `OUT OF BOUNDS`     | INV_ADDRESS       |
| `INVALID COMMAND`   | INV_OP            |
| `INVALID ARGUMENTS` | INV_OP            |
| `NUMBER OVERFLOW`   | OVERFLOW          |
| `NOT A NUMBER`      | INV_ASSIGN        |
| `INVALID WORD`      | INV_ASSIGN        |
| `UNHANDLED COMMAND` |                   |
| `ARGUMENT ERROR`    |                   |
| `DISK ERROR`        |                   |
| `INTERNAL ERROR`    |                   |
*/
